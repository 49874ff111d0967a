//! Security-id rules.
//!
//! Applications are identified by numeric security ids. A handful of platform
//! services hold reserved ids below [`RESERVED_RANGE_END`] and are also known by
//! a common name starting with [`RESERVED_PREFIX`].

/// Prefix carried by the common name of every reserved identity
pub const RESERVED_PREFIX: &str = "_Ts_";

/// Numeric ids in `[0, RESERVED_RANGE_END)` belong to the platform
pub const RESERVED_RANGE_END: i64 = 1000;

/// A platform identity with a fixed security id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedId {
    pub id: &'static str,
    pub common_name: &'static str,
}

pub const CERTIFICATE_AUTHORITY: ReservedId = ReservedId {
    id: "00",
    common_name: "_Ts_CA",
};
pub const ISSUING_SERVICE: ReservedId = ReservedId {
    id: "01",
    common_name: "_Ts_Issuer",
};
pub const FRONT_END: ReservedId = ReservedId {
    id: "02",
    common_name: "_Ts_FrontEnd",
};
pub const REGISTRATION: ReservedId = ReservedId {
    id: "03",
    common_name: "_Ts_Registration",
};
pub const DEPLOYER: ReservedId = ReservedId {
    id: "04",
    common_name: "_Ts_Deployer",
};

pub const RESERVED_IDS: [ReservedId; 5] = [
    CERTIFICATE_AUTHORITY,
    ISSUING_SERVICE,
    FRONT_END,
    REGISTRATION,
    DEPLOYER,
];

/// Whether `id` names a reserved platform identity, either by common name or
/// by a number in the reserved range.
pub fn is_reserved(id: &str) -> bool {
    if id.starts_with(RESERVED_PREFIX) {
        return true;
    }
    matches!(id.parse::<i64>(), Ok(n) if (0..RESERVED_RANGE_END).contains(&n))
}

/// Whether `id` is already a security id and needs no name resolution
pub fn is_security_id(id: &str) -> bool {
    is_reserved(id) || id.parse::<i64>().is_ok()
}

/// Find a reserved identity by its id or common name
pub fn lookup_reserved(id_or_name: &str) -> Option<ReservedId> {
    RESERVED_IDS
        .iter()
        .copied()
        .find(|r| r.id == id_or_name || r.common_name == id_or_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_by_prefix_or_range() {
        assert!(is_reserved("_Ts_Issuer"));
        assert!(is_reserved("_Ts_SomethingNew"));
        assert!(is_reserved("01"));
        assert!(is_reserved("999"));
        assert!(!is_reserved("1000"));
        assert!(!is_reserved("-1"));
        assert!(!is_reserved("app-42"));
    }

    #[test]
    fn numeric_ids_need_no_resolution() {
        assert!(is_security_id("1000"));
        assert!(is_security_id("123456"));
        assert!(is_security_id("_Ts_FrontEnd"));
        assert!(!is_security_id("app-42"));
        assert!(!is_security_id(""));
    }

    #[test]
    fn lookup_by_either_form() {
        assert_eq!(lookup_reserved("02"), Some(FRONT_END));
        assert_eq!(lookup_reserved("_Ts_Deployer"), Some(DEPLOYER));
        assert_eq!(lookup_reserved("05"), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_integer_is_a_security_id(n in any::<i64>()) {
                prop_assert!(is_security_id(&n.to_string()));
                prop_assert_eq!(is_reserved(&n.to_string()), (0..RESERVED_RANGE_END).contains(&n));
            }

            #[test]
            fn names_are_not_security_ids(name in "[a-z][a-z-]{0,20}") {
                prop_assert!(!is_security_id(&name));
            }
        }
    }
}
