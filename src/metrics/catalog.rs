//! Resource catalog
//!
//! Every resource the exporter understands is declared here, keyed by the
//! resource name the API uses. Binary resources get their state labels from
//! the first matching entry in [`POLICY_PATTERNS`], resolved once when the
//! registry is built.

/// Names for the two states of a binary resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPolicy {
    pub name: &'static str,
    /// Label for a raw `"true"`
    pub on: &'static str,
    /// Label for a raw `"false"`
    pub off: &'static str,
}

impl LabelPolicy {
    pub fn label(&self, state: bool) -> &'static str {
        if state {
            self.on
        } else {
            self.off
        }
    }

    /// Both labels, in exposition order
    pub fn states(&self) -> [&'static str; 2] {
        [self.on, self.off]
    }
}

pub const LOCK_POLICY: LabelPolicy = LabelPolicy {
    name: "lock",
    on: "locked",
    off: "unlocked",
};

pub const LIGHT_POLICY: LabelPolicy = LabelPolicy {
    name: "light",
    on: "on",
    off: "off",
};

pub const DOOR_POLICY: LabelPolicy = LabelPolicy {
    name: "door",
    on: "open",
    off: "closed",
};

/// Ordered `(substring, policy)` rules; the first match wins
pub const POLICY_PATTERNS: &[(&str, LabelPolicy)] =
    &[("lock", LOCK_POLICY), ("Light", LIGHT_POLICY)];

/// Policy for binary resources no pattern matches
pub const DEFAULT_POLICY: LabelPolicy = DOOR_POLICY;

pub fn policy_for(resource: &str) -> LabelPolicy {
    POLICY_PATTERNS
        .iter()
        .find(|(pattern, _)| resource.contains(*pattern))
        .map(|(_, policy)| *policy)
        .unwrap_or(DEFAULT_POLICY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind {
    Numeric,
    BinaryState,
}

/// Static declaration of one resource
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    pub resource: &'static str,
    pub metric: &'static str,
    pub help: &'static str,
    pub kind: DeclaredKind,
}

const fn numeric(resource: &'static str, metric: &'static str, help: &'static str) -> ResourceSpec {
    ResourceSpec {
        resource,
        metric,
        help,
        kind: DeclaredKind::Numeric,
    }
}

const fn binary(resource: &'static str, metric: &'static str, help: &'static str) -> ResourceSpec {
    ResourceSpec {
        resource,
        metric,
        help,
        kind: DeclaredKind::BinaryState,
    }
}

pub const RESOURCE_CATALOG: &[ResourceSpec] = &[
    // Fuel and charge
    numeric("tanklevelpercent", "tank_level_percent", "Liquid fuel tank level (Percent)"),
    numeric("rangeliquid", "range_liquid_km", "Liquid fuel range (KM)"),
    numeric("soc", "state_of_charge_percent", "Battery state of charge (Percent)"),
    numeric("rangeelectric", "range_electric_km", "Electric range (KM)"),
    // Driving
    numeric("odo", "odometer", "Odometer (KM)"),
    numeric("positionHeading", "position_heading", "Vehicle heading position (Degrees)"),
    // Integer lock code, not a boolean
    numeric("doorlockstatusvehicle", "door_lockstatus_vehicle", "Vehicle lock status"),
    // Doors
    binary("doorstatusfrontleft", "door_status_frontleft", "Status of the front left door"),
    binary("doorstatusfrontright", "door_status_frontright", "Status of the front right door"),
    binary("doorstatusrearleft", "door_status_rearleft", "Status of the rear left door"),
    binary("doorstatusrearright", "door_status_rearright", "Status of the rear right door"),
    binary("decklidstatus", "decklid_status", "Status of the deck lid"),
    // Lights
    binary("interiorLightsFront", "interior_lights_front", "Status of the interior front light"),
    binary("interiorLightsRear", "interior_lights_rear", "Status of the interior rear light"),
    // Locks
    binary("doorlockstatusdecklid", "door_lockstatus_decklid", "Lock status of the deck lid"),
    binary("doorlockstatusgas", "door_lockstatus_gas", "Status of gas tank door lock"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_policy_patterns() {
        assert_eq!(policy_for("doorlockstatusdecklid"), LOCK_POLICY);
        assert_eq!(policy_for("doorlockstatusgas"), LOCK_POLICY);
        assert_eq!(policy_for("interiorLightsFront"), LIGHT_POLICY);
        assert_eq!(policy_for("interiorLightsRear"), LIGHT_POLICY);
        assert_eq!(policy_for("doorstatusfrontleft"), DOOR_POLICY);
        assert_eq!(policy_for("decklidstatus"), DOOR_POLICY);
        // Case matters: only the camel-cased "Light" selects the light policy
        assert_eq!(policy_for("lightswitch"), DOOR_POLICY);
    }

    #[test]
    fn test_policy_labels() {
        assert_eq!(LOCK_POLICY.label(true), "locked");
        assert_eq!(LOCK_POLICY.label(false), "unlocked");
        assert_eq!(LIGHT_POLICY.label(true), "on");
        assert_eq!(LIGHT_POLICY.label(false), "off");
        assert_eq!(DOOR_POLICY.label(true), "open");
        assert_eq!(DOOR_POLICY.label(false), "closed");
    }

    #[test]
    fn test_catalog_is_unique() {
        let resources: HashSet<_> = RESOURCE_CATALOG.iter().map(|s| s.resource).collect();
        let metrics: HashSet<_> = RESOURCE_CATALOG.iter().map(|s| s.metric).collect();
        assert_eq!(resources.len(), RESOURCE_CATALOG.len());
        assert_eq!(metrics.len(), RESOURCE_CATALOG.len());
    }

    #[test]
    fn test_lock_code_is_numeric() {
        let spec = RESOURCE_CATALOG
            .iter()
            .find(|s| s.resource == "doorlockstatusvehicle")
            .unwrap();
        assert_eq!(spec.kind, DeclaredKind::Numeric);
    }
}
