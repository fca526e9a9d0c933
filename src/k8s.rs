use anyhow::{Context, Result};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client, Config};
use tracing::debug;

use crate::model::{Collection, KANISTER_GROUP, KANISTER_VERSION};

/// Read access to the Kanister custom resources of one namespace.
pub trait KanisterApi: Send + Sync + 'static {
    fn list(
        &self,
        collection: Collection,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<DynamicObject>>> + Send;
}

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    context: String,
    cluster: String,
}

impl KubeGateway {
    /// Uses the kubeconfig when one is readable, otherwise in-cluster configuration.
    pub async fn new(context: Option<String>) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().ok();

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if context.is_some() {
                anyhow::bail!(
                    "kubeconfig not found; a context cannot be selected in this environment"
                );
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let cluster = config.cluster_url.to_string();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;

        let context = context
            .or_else(|| {
                kubeconfig
                    .as_ref()
                    .and_then(|cfg| cfg.current_context.clone())
            })
            .unwrap_or_else(|| "in-cluster".to_string());

        Ok(Self {
            client,
            context,
            cluster,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }
}

impl KanisterApi for KubeGateway {
    async fn list(&self, collection: Collection, namespace: &str) -> Result<Vec<DynamicObject>> {
        let resources: Api<DynamicObject> = Api::namespaced_with(
            self.client.clone(),
            namespace,
            &kanister_api_resource(collection),
        );
        let list = resources
            .list(&ListParams::default())
            .await
            .with_context(|| format!("listing {} in namespace {namespace}", collection.plural()))?;
        debug!(%collection, namespace, count = list.items.len(), "listed Kanister resources");
        Ok(list.items)
    }
}

fn kanister_api_resource(collection: Collection) -> ApiResource {
    let gvk = GroupVersionKind::gvk(KANISTER_GROUP, KANISTER_VERSION, collection.kind());
    ApiResource::from_gvk_with_plural(&gvk, collection.plural())
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;

    #[derive(Debug, Clone)]
    enum Reply {
        Items(Vec<Value>),
        Fail(String),
        Hang,
    }

    /// Serves canned objects per collection; a collection can also fail or never answer.
    #[derive(Debug, Clone, Default)]
    pub struct FakeKanisterApi {
        replies: HashMap<Collection, Reply>,
    }

    impl FakeKanisterApi {
        pub fn with_items(mut self, collection: Collection, items: Vec<Value>) -> Self {
            self.replies.insert(collection, Reply::Items(items));
            self
        }

        pub fn failing(mut self, collection: Collection, message: &str) -> Self {
            self.replies
                .insert(collection, Reply::Fail(message.to_string()));
            self
        }

        pub fn hanging(mut self, collection: Collection) -> Self {
            self.replies.insert(collection, Reply::Hang);
            self
        }
    }

    impl KanisterApi for FakeKanisterApi {
        async fn list(&self, collection: Collection, namespace: &str) -> Result<Vec<DynamicObject>> {
            match self.replies.get(&collection).cloned() {
                None => Ok(Vec::new()),
                Some(Reply::Items(items)) => items
                    .into_iter()
                    .map(|mut item| {
                        item["metadata"]["namespace"] = Value::from(namespace);
                        serde_json::from_value(item).context("invalid fake object")
                    })
                    .collect(),
                Some(Reply::Fail(message)) => Err(anyhow::anyhow!(message)),
                Some(Reply::Hang) => std::future::pending().await,
            }
        }
    }
}
