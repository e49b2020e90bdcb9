//! Protocol revisions and feature gating.
//!
//! The server and client negotiate a revision during the handshake. Which
//! wire forms are in play for a given block depends only on that revision
//! and on the [`FeatureTable`] in use, both carried by [`ProtocolVersion`]
//! and passed into every encode/decode call.

/// Minimum revision constants
pub const DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES: u64 = 50264;
pub const DBMS_MIN_REVISION_WITH_BLOCK_INFO: u64 = 51903;
pub const DBMS_MIN_REVISION_WITH_CUSTOM_SERIALIZATION: u64 = 54454;

/// Revision spoken by this crate.
pub const DBMS_TCP_PROTOCOL_VERSION: u64 = 54460;

/// Protocol features that change the wire layout of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Empty temporary table name precedes each data block.
    TempTables,
    /// Block header carries field-numbered block info.
    BlockInfo,
    /// Column type may be sent as a boolean flag plus binary type code.
    CustomSerialization,
}

impl Feature {
    pub const ALL: [Feature; 3] = [
        Feature::TempTables,
        Feature::BlockInfo,
        Feature::CustomSerialization,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::TempTables => "TempTables",
            Feature::BlockInfo => "BlockInfo",
            Feature::CustomSerialization => "CustomSerialization",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Minimal revision for each [`Feature`].
///
/// Immutable once built; the default table holds the revisions of the
/// reference server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureTable {
    temp_tables: u64,
    block_info: u64,
    custom_serialization: u64,
}

impl FeatureTable {
    /// Override the minimal revision of one feature.
    pub fn with(mut self, feature: Feature, revision: u64) -> Self {
        *self.slot_mut(feature) = revision;
        self
    }

    /// Minimal revision at which `feature` is active.
    pub fn revision(&self, feature: Feature) -> u64 {
        match feature {
            Feature::TempTables => self.temp_tables,
            Feature::BlockInfo => self.block_info,
            Feature::CustomSerialization => self.custom_serialization,
        }
    }

    /// Reports whether `feature` is active at `revision`.
    pub fn supports(&self, feature: Feature, revision: u64) -> bool {
        revision >= self.revision(feature)
    }

    fn slot_mut(&mut self, feature: Feature) -> &mut u64 {
        match feature {
            Feature::TempTables => &mut self.temp_tables,
            Feature::BlockInfo => &mut self.block_info,
            Feature::CustomSerialization => &mut self.custom_serialization,
        }
    }
}

impl Default for FeatureTable {
    fn default() -> Self {
        Self {
            temp_tables: DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES,
            block_info: DBMS_MIN_REVISION_WITH_BLOCK_INFO,
            custom_serialization: DBMS_MIN_REVISION_WITH_CUSTOM_SERIALIZATION,
        }
    }
}

/// Negotiated revision together with the feature table to evaluate it
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub revision: u64,
    pub features: FeatureTable,
}

impl ProtocolVersion {
    /// Revision of this crate with the default feature table.
    pub const CURRENT: ProtocolVersion = ProtocolVersion {
        revision: DBMS_TCP_PROTOCOL_VERSION,
        features: FeatureTable {
            temp_tables: DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES,
            block_info: DBMS_MIN_REVISION_WITH_BLOCK_INFO,
            custom_serialization: DBMS_MIN_REVISION_WITH_CUSTOM_SERIALIZATION,
        },
    };

    pub fn new(revision: u64) -> Self {
        Self { revision, features: FeatureTable::default() }
    }

    pub fn with_features(mut self, features: FeatureTable) -> Self {
        self.features = features;
        self
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.features.supports(feature, self.revision)
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_constants() {
        let table = FeatureTable::default();
        assert_eq!(
            table.revision(Feature::CustomSerialization),
            DBMS_MIN_REVISION_WITH_CUSTOM_SERIALIZATION
        );
        assert!(table.supports(Feature::BlockInfo, 51903));
        assert!(!table.supports(Feature::BlockInfo, 51902));
    }

    #[test]
    fn test_current_supports_everything() {
        for feature in Feature::ALL {
            assert!(ProtocolVersion::CURRENT.supports(feature), "{}", feature);
        }
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::CURRENT);
    }

    #[test]
    fn test_override_feature_revision() {
        let table = FeatureTable::default()
            .with(Feature::CustomSerialization, u64::MAX);
        let proto = ProtocolVersion::new(54460).with_features(table);

        assert!(!proto.supports(Feature::CustomSerialization));
        assert!(proto.supports(Feature::BlockInfo));
    }

    #[test]
    fn test_legacy_revision() {
        let proto = ProtocolVersion::new(54449);
        assert!(!proto.supports(Feature::CustomSerialization));
        assert!(proto.supports(Feature::TempTables));
    }
}
