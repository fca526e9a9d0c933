use crate::model::Collection;
use std::error::Error;
use std::time::Duration;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Why a view could not be built. A failure never carries a partial view.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to list Kanister {collection}")]
    Fetch {
        collection: Collection,
        #[source]
        source: BoxError,
    },

    #[error("malformed Kanister {collection} object")]
    Normalize {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("view build cancelled")]
    Cancelled,

    #[error("view build exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl ViewError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Normalize { .. } => "normalize",
            Self::Cancelled | Self::DeadlineExceeded(_) => "cancel",
        }
    }

    pub fn collection(&self) -> Option<Collection> {
        match self {
            Self::Fetch { collection, .. } | Self::Normalize { collection, .. } => {
                Some(*collection)
            }
            Self::Cancelled | Self::DeadlineExceeded(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template parse error")]
    TemplateParse(#[source] tera::Error),

    #[error("template rendering failed")]
    TemplateRender(#[source] tera::Error),

    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),
}

/// Joins an error and every `source()` below it with `": "`.
pub fn error_chain(error: &dyn Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_their_stage_and_collection() {
        let fetch = ViewError::Fetch {
            collection: Collection::Blueprints,
            source: "connection refused".into(),
        };
        assert_eq!(fetch.stage(), "fetch");
        assert_eq!(fetch.collection(), Some(Collection::Blueprints));
        assert_eq!(fetch.to_string(), "failed to list Kanister Blueprints");
        assert_eq!(
            error_chain(&fetch),
            "failed to list Kanister Blueprints: connection refused"
        );

        assert_eq!(ViewError::Cancelled.stage(), "cancel");
        assert_eq!(ViewError::Cancelled.collection(), None);
    }

    #[test]
    fn error_chain_reaches_the_root_cause() {
        let fetch = ViewError::Fetch {
            collection: Collection::Profiles,
            source: anyhow::anyhow!("403 Forbidden: profiles is forbidden")
                .context("listing profiles in namespace kanister")
                .into(),
        };

        assert_eq!(
            error_chain(&fetch),
            "failed to list Kanister Profiles: listing profiles in namespace kanister: \
             403 Forbidden: profiles is forbidden"
        );
    }
}
