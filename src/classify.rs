//! Presentation categories for Kanister records.
//!
//! Every lookup is an exact, case-sensitive match against an immutable table
//! with a single fallback. None of these functions can fail.

use serde::Serialize;

/// An image the page shows next to a record. `asset` is relative to `/static`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Icon {
    pub key: &'static str,
    pub asset: &'static str,
    pub alt: &'static str,
}

pub const FAILED_STATUS_CLASS: &str = "failed-status";

const FAILED_STATE: &str = "failed";

const S3_ICON: Icon = Icon {
    key: "s3",
    asset: "s3_image.png",
    alt: "S3 Image",
};
const AZURE_ICON: Icon = Icon {
    key: "azure",
    asset: "azure_image.png",
    alt: "Azure Image",
};
const GCS_ICON: Icon = Icon {
    key: "gcs",
    asset: "gcs_image.png",
    alt: "GCS Image",
};

pub const DEFAULT_BLUEPRINT_ICON: Icon = Icon {
    key: "default",
    asset: "blueprints/blueprint.png",
    alt: "Default Blueprint Image",
};

const RDS_ICON: Icon = Icon {
    key: "rds",
    asset: "blueprints/amazon-rds-logo.png",
    alt: "RDS Postgres Logo",
};

pub const LOCATION_ICONS: &[(&str, Icon)] = &[
    ("s3Compliant", S3_ICON),
    ("azure", AZURE_ICON),
    ("gcs", GCS_ICON),
];

pub const BLUEPRINT_ICONS: &[(&str, Icon)] = &[
    (
        "elasticsearch-blueprint",
        Icon {
            key: "elasticsearch",
            asset: "blueprints/elasticsearch-logo.png",
            alt: "Elasticsearch Logo",
        },
    ),
    (
        "mysql-blueprint",
        Icon {
            key: "mysql",
            asset: "blueprints/mysql-logo.png",
            alt: "MySQL Logo",
        },
    ),
    (
        "postgres-bp",
        Icon {
            key: "postgresql",
            asset: "blueprints/postgresql-logo.png",
            alt: "PostgreSQL Logo",
        },
    ),
    (
        "rds-aurora-snapshot-bp",
        Icon {
            key: "aurora",
            asset: "blueprints/amazon-aurora-logo.png",
            alt: "Amazon Aurora Logo",
        },
    ),
    ("rds-postgres-blueprint", RDS_ICON),
    ("rds-postgres-dump-bp", RDS_ICON),
    ("rds-postgres-snapshot-bp", RDS_ICON),
    (
        "cassandra-blueprint",
        Icon {
            key: "cassandra",
            asset: "blueprints/cassandra-logo.png",
            alt: "Cassandra Logo",
        },
    ),
    (
        "cockroachdb-blueprint",
        Icon {
            key: "cockroachdb",
            asset: "blueprints/cockroachdb-logo.png",
            alt: "Cockroachdb Logo",
        },
    ),
    (
        "couchbase-blueprint",
        Icon {
            key: "couchbase",
            asset: "blueprints/couchbase-logo.png",
            alt: "Couchbase Logo",
        },
    ),
    (
        "etcd-blueprint",
        Icon {
            key: "etcd",
            asset: "blueprints/etcd-logo.png",
            alt: "etcd Logo",
        },
    ),
    (
        "foundationdb-blueprint",
        Icon {
            key: "foundationdb",
            asset: "blueprints/FoundationDB-logo.png",
            alt: "FoundationDB Logo",
        },
    ),
    (
        "k8ssandra-blueprint",
        Icon {
            key: "k8ssandra",
            asset: "blueprints/k8ssandra-logo.png",
            alt: "k8ssandra Logo",
        },
    ),
    (
        "kafka-blueprint",
        Icon {
            key: "kafka",
            asset: "blueprints/kafka-logo.png",
            alt: "Kafka Logo",
        },
    ),
    (
        "maria-blueprint",
        Icon {
            key: "mariadb",
            asset: "blueprints/mariadb-logo.png",
            alt: "MariaDB Logo",
        },
    ),
    (
        "mongodb-blueprint",
        Icon {
            key: "mongodb",
            asset: "blueprints/mongodb-logo.png",
            alt: "MongoDB Logo",
        },
    ),
    (
        "mssql-blueprint",
        Icon {
            key: "mssql",
            asset: "blueprints/microsoftsql-logo.png",
            alt: "Microsoft SQL Logo",
        },
    ),
    (
        "redis-blueprint",
        Icon {
            key: "redis",
            asset: "blueprints/redis-logo.png",
            alt: "Redis Logo",
        },
    ),
];

fn lookup(table: &[(&str, Icon)], name: &str) -> Option<Icon> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, icon)| *icon)
}

/// Unknown, empty or missing location types get no icon.
pub fn icon_for_location_type(location_type: Option<&str>) -> Option<Icon> {
    location_type.and_then(|value| lookup(LOCATION_ICONS, value))
}

pub fn icon_for_blueprint_name(name: &str) -> Icon {
    lookup(BLUEPRINT_ICONS, name).unwrap_or(DEFAULT_BLUEPRINT_ICON)
}

pub fn status_class_for_state(state: &str) -> Option<&'static str> {
    (state == FAILED_STATE).then_some(FAILED_STATUS_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn known_location_types_resolve_to_icons() {
        assert_eq!(icon_for_location_type(Some("s3Compliant")).unwrap().key, "s3");
        assert_eq!(icon_for_location_type(Some("azure")).unwrap().key, "azure");
        assert_eq!(icon_for_location_type(Some("gcs")).unwrap().key, "gcs");
    }

    #[test]
    fn other_location_types_have_no_icon() {
        for value in ["", "S3Compliant", "s3", "kopia", "AZURE", " gcs"] {
            assert_eq!(icon_for_location_type(Some(value)), None, "{value:?}");
        }
        assert_eq!(icon_for_location_type(None), None);
    }

    #[test]
    fn known_blueprints_never_fall_back_to_default() {
        for (name, icon) in BLUEPRINT_ICONS {
            assert_eq!(icon_for_blueprint_name(name), *icon);
            assert_ne!(icon.key, DEFAULT_BLUEPRINT_ICON.key, "{name}");
        }
        assert_eq!(icon_for_blueprint_name("redis-blueprint").key, "redis");
        assert_eq!(icon_for_blueprint_name("rds-postgres-dump-bp").key, "rds");
    }

    #[test]
    fn unknown_blueprints_use_default_icon() {
        for name in ["custom-bp", "", "Redis-Blueprint", "mysql-blueprint "] {
            assert_eq!(icon_for_blueprint_name(name).key, "default", "{name:?}");
        }
    }

    #[test]
    fn lookup_tables_have_unique_names() {
        for table in [LOCATION_ICONS, BLUEPRINT_ICONS] {
            let names = table.iter().map(|(name, _)| *name).collect::<HashSet<_>>();
            assert_eq!(names.len(), table.len());
        }
        assert_eq!(BLUEPRINT_ICONS.len(), 18);
    }

    #[test]
    fn only_failed_state_gets_a_status_class() {
        assert_eq!(status_class_for_state("failed"), Some("failed-status"));
        for state in ["", "running", "complete", "pending", "Failed", "attemptFailed"] {
            assert_eq!(status_class_for_state(state), None, "{state:?}");
        }
    }
}
