//! Lifecycle Dispatcher - Runtime Event to Ordered Actions

use tracing::{debug, warn};

use crate::condition::ConditionEvaluator;
use crate::context::LifecycleContext;
use crate::resources::{AppConfig, Lifecycle, LifecycleAction};

pub const CONVERSATION_START: &str = "conversation_start";
pub const MESSAGE_RECEIVED: &str = "message_received";
pub const SURVEY_COMPLETE: &str = "survey_complete";
pub const VISUALIZATION_SHOWN: &str = "visualization_shown";

const BUILTIN_EVENTS: [&str; 4] = [CONVERSATION_START, MESSAGE_RECEIVED, SURVEY_COMPLETE, VISUALIZATION_SHOWN];

fn builtin_actions<'a>(lifecycle: &'a Lifecycle, event: &str) -> Option<&'a Option<Vec<LifecycleAction>>> {
    match event {
        CONVERSATION_START => Some(&lifecycle.on_conversation_start),
        MESSAGE_RECEIVED => Some(&lifecycle.on_message_received),
        SURVEY_COMPLETE => Some(&lifecycle.on_survey_complete),
        VISUALIZATION_SHOWN => Some(&lifecycle.on_visualization_shown),
        _ => None,
    }
}

/// Every configured action for `event`, unfiltered.
///
/// Built-in event names never fall through to `onCustomEvent`.
pub fn actions_for_event<'a>(config: &'a AppConfig, event: &str) -> &'a [LifecycleAction] {
    let Some(lifecycle) = config.lifecycle.as_ref() else {
        return &[];
    };
    let actions = match builtin_actions(lifecycle, event) {
        Some(actions) => actions.as_ref(),
        None => lifecycle.on_custom_event.as_ref().and_then(|custom| custom.get(event)),
    };
    actions.map(Vec::as_slice).unwrap_or(&[])
}

/// Event names that have at least one configured action list.
pub fn lifecycle_events(config: &AppConfig) -> Vec<String> {
    let Some(lifecycle) = config.lifecycle.as_ref() else {
        return vec![];
    };
    let mut events: Vec<String> = BUILTIN_EVENTS
        .iter()
        .filter(|event| matches!(builtin_actions(lifecycle, event), Some(Some(_))))
        .map(|event| event.to_string())
        .collect();
    if let Some(custom) = &lifecycle.on_custom_event {
        events.extend(custom.keys().cloned());
    }
    events
}

/// Actions for `context.event` whose condition holds, in declaration order.
///
/// Conditions see the context's data, or an empty map when none was given.
/// A condition that fails to evaluate excludes its action.
pub fn dispatch(
    config: &AppConfig,
    context: &LifecycleContext,
    conditions: &dyn ConditionEvaluator,
) -> Vec<LifecycleAction> {
    let actions = actions_for_event(config, &context.event);
    if actions.is_empty() {
        debug!(event = %context.event, "no lifecycle actions");
        return vec![];
    }

    let scope = context.to_render_context();
    actions
        .iter()
        .filter(|action| match action.condition.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(condition) => match conditions.evaluate(condition, &scope) {
                Ok(holds) => holds,
                Err(e) => {
                    warn!(event = %context.event, condition, error = %e, "lifecycle condition failed, skipping action");
                    false
                }
            },
        })
        .cloned()
        .collect()
}
