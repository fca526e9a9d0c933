use chrono::{DateTime, Local};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use serde::Serialize;
use std::collections::HashSet;

use crate::classify::{
    Icon, icon_for_blueprint_name, icon_for_location_type, status_class_for_state,
};
use crate::model::{Action, ActionSet, Blueprint, Profile};

/// Everything the page template reads. Slices keep the order they were fetched in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub namespace: String,
    pub generated_at: String,
    pub profiles: Vec<ProfileView>,
    pub blueprints: Vec<BlueprintView>,
    pub action_sets: Vec<ActionSetView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: String,
    pub location_type: String,
    pub bucket: String,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlueprintView {
    pub name: String,
    pub icon: Icon,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSetView {
    pub name: String,
    pub state: String,
    pub status_class: Option<&'static str>,
    pub age: String,
    pub progress: Option<String>,
    pub error: Option<String>,
    pub actions: Vec<ActionView>,
}

/// An Action as fetched, plus markers for references that match nothing fetched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionView {
    pub action: Action,
    pub profile_name: String,
    pub dangling_blueprint: bool,
    pub dangling_profile: bool,
}

impl ViewModel {
    pub fn assemble(
        namespace: &str,
        now: DateTime<Local>,
        profiles: Vec<Profile>,
        blueprints: Vec<Blueprint>,
        action_sets: Vec<ActionSet>,
    ) -> Self {
        let profile_names = profiles
            .iter()
            .map(|profile| profile.name().to_string())
            .collect::<HashSet<_>>();
        let blueprint_names = blueprints
            .iter()
            .map(|blueprint| blueprint.name().to_string())
            .collect::<HashSet<_>>();

        let action_sets = action_sets
            .into_iter()
            .map(|action_set| {
                action_set_view(action_set, &profile_names, &blueprint_names, now)
            })
            .collect();

        Self {
            namespace: namespace.to_string(),
            generated_at: now.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
            profiles: profiles.iter().map(profile_view).collect(),
            blueprints: blueprints.iter().map(blueprint_view).collect(),
            action_sets,
        }
    }
}

fn profile_view(profile: &Profile) -> ProfileView {
    ProfileView {
        name: profile.name().to_string(),
        location_type: profile.location_type().unwrap_or_default().to_string(),
        bucket: profile.bucket().unwrap_or_default().to_string(),
        icon: icon_for_location_type(profile.location_type()),
    }
}

fn blueprint_view(blueprint: &Blueprint) -> BlueprintView {
    BlueprintView {
        name: blueprint.name().to_string(),
        icon: icon_for_blueprint_name(blueprint.name()),
        actions: blueprint.action_names(),
    }
}

fn action_set_view(
    action_set: ActionSet,
    profile_names: &HashSet<String>,
    blueprint_names: &HashSet<String>,
    now: DateTime<Local>,
) -> ActionSetView {
    let name = action_set.name().to_string();
    let state = action_set.state().to_string();
    let age = human_age(action_set.metadata.creation_timestamp.as_ref(), now);
    let progress = action_set
        .status
        .as_ref()
        .and_then(|status| status.progress.as_ref())
        .and_then(|progress| progress.percent_completed.clone())
        .filter(|percent| !percent.is_empty());
    let error = action_set
        .status
        .as_ref()
        .and_then(|status| status.error.as_ref())
        .map(|error| error.message.clone())
        .filter(|message| !message.is_empty());

    let actions = action_set
        .spec
        .map(|spec| spec.actions)
        .unwrap_or_default()
        .into_iter()
        .map(|action| {
            let profile_name = action.profile_name().to_string();
            ActionView {
                dangling_blueprint: !action.blueprint.is_empty()
                    && !blueprint_names.contains(&action.blueprint),
                dangling_profile: !profile_name.is_empty()
                    && !profile_names.contains(&profile_name),
                profile_name,
                action,
            }
        })
        .collect();

    ActionSetView {
        status_class: status_class_for_state(&state),
        name,
        state,
        age,
        progress,
        error,
        actions,
    }
}

fn human_age(timestamp: Option<&Time>, now: DateTime<Local>) -> String {
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };

    format_elapsed_seconds((now.timestamp() - timestamp.0.as_second()).max(0))
}

fn format_elapsed_seconds(seconds: i64) -> String {
    if seconds >= 86_400 {
        return format!("{}d", seconds / 86_400);
    }

    if seconds >= 3_600 {
        return format!("{}h", seconds / 3_600);
    }

    if seconds >= 60 {
        return format!("{}m", seconds / 60);
    }

    format!("{seconds}s")
}
