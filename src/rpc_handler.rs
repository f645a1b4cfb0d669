//! JSON method handler for the rendering layer.
//!
//! `handle_method` dispatches one `{method, params}` call to the engine's
//! mutators and queries. Stale ids yield `{"ok": false}` rather than errors;
//! errors are reserved for bad params and infrastructure failures.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::engine::Engine;
use crate::host::{TabEvent, TabHost};
use crate::managers::selection_manager::{ClickKind, FocusDirection};
use crate::store::Store;
use crate::types::backup::Backup;
use crate::types::item::{Destination, GroupColor};
use crate::types::session::RestoreOutcome;
use crate::types::tab::TabId;

fn param<T: DeserializeOwned>(params: &Value, name: &str) -> Result<T, String> {
    let value = params.get(name).ok_or_else(|| format!("missing {}", name))?;
    serde_json::from_value(value.clone()).map_err(|e| format!("invalid {}: {}", name, e))
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn ok(changed: bool) -> Value {
    json!({"ok": changed})
}

/// Serializable view of everything the rendering layer draws.
pub fn state_snapshot<S: Store, H: TabHost>(engine: &Engine<S, H>) -> Value {
    let metadata: serde_json::Map<String, Value> = engine
        .metadata()
        .iter()
        .map(|(id, m)| (id.to_string(), json!(m)))
        .collect();
    let names: serde_json::Map<String, Value> = engine
        .custom_names()
        .iter()
        .map(|(id, name)| (id.to_string(), json!(name)))
        .collect();
    json!({
        "items": engine.model().items(),
        "metadata": metadata,
        "customNames": names,
        "sessions": engine.sessions(),
        "selection": {
            "selected": engine.selected_tabs(),
            "lastClicked": engine.selection().last_clicked(),
            "focused": engine.selection().focused(),
        },
        "settings": engine.settings(),
    })
}

/// Dispatch a method call to the engine.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method<S: Store, H: TabHost>(
    engine: &mut Engine<S, H>,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),
        "state.get" => Ok(state_snapshot(engine)),

        // ─── Host events forwarded by the browser side ───
        "host.event" => {
            let event: TabEvent = param(params, "event")?;
            engine.handle_event(event, Instant::now()).map_err(|e| e.to_string())?;
            Ok(ok(true))
        }
        "host.flush" => {
            let report = engine.flush_all(Instant::now()).map_err(|e| e.to_string())?;
            Ok(json!({"removedTabs": report.removed_tabs, "autosavedGroups": report.autosaved_groups}))
        }

        // ─── Tabs ───
        "tabs.move" => {
            let tabs: Vec<TabId> = param(params, "tabIds")?;
            let destination: Destination = param(params, "destination")?;
            engine.move_tabs(&tabs, &destination).map(ok).map_err(|e| e.to_string())
        }
        "tabs.close" => {
            let tabs: Vec<TabId> = param(params, "tabIds")?;
            engine.close_tabs(&tabs).map(ok).map_err(|e| e.to_string())
        }
        "tabs.rename" => {
            let tab: TabId = param(params, "tabId")?;
            let name = str_param(params, "name")?;
            engine.set_custom_name(tab, name).map(ok).map_err(|e| e.to_string())
        }

        // ─── Groups ───
        "group.create" => {
            let tabs: Vec<TabId> = param(params, "tabIds")?;
            let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
            let id = engine.create_group(&tabs, name).map_err(|e| e.to_string())?;
            Ok(json!({"ok": id.is_some(), "groupId": id}))
        }
        "group.dissolve" => {
            let id = str_param(params, "groupId")?;
            engine.dissolve_group(id).map(ok).map_err(|e| e.to_string())
        }
        "group.ungroupTab" => {
            let tab: TabId = param(params, "tabId")?;
            let id = str_param(params, "groupId")?;
            engine.ungroup_tab(tab, id).map(ok).map_err(|e| e.to_string())
        }
        "group.move" => {
            let id = str_param(params, "groupId")?;
            let index: usize = param(params, "index")?;
            engine.move_group(id, index).map(ok).map_err(|e| e.to_string())
        }
        "group.rename" => {
            let id = str_param(params, "groupId")?;
            let name = str_param(params, "name")?;
            engine.rename_group(id, name).map(ok).map_err(|e| e.to_string())
        }
        "group.setColor" => {
            let id = str_param(params, "groupId")?;
            let color: GroupColor = param(params, "color")?;
            engine.set_group_color(id, color).map(ok).map_err(|e| e.to_string())
        }
        "group.setCollapsed" => {
            let id = str_param(params, "groupId")?;
            let collapsed: bool = param(params, "collapsed")?;
            engine.set_group_collapsed(id, collapsed).map(ok).map_err(|e| e.to_string())
        }
        "group.setAutoSave" => {
            let id = str_param(params, "groupId")?;
            let enabled: bool = param(params, "autoSave")?;
            engine.set_group_auto_save(id, enabled).map(ok).map_err(|e| e.to_string())
        }
        "group.close" => {
            let id = str_param(params, "groupId")?;
            engine.close_group(id).map(ok).map_err(|e| e.to_string())
        }
        "group.focus" => {
            let id = str_param(params, "groupId")?;
            engine.focus_group(id).map(ok).map_err(|e| e.to_string())
        }

        // ─── Sessions ───
        "session.list" => Ok(json!(engine.sessions())),
        "session.save" => {
            let id = str_param(params, "groupId")?;
            let session = engine.save_session(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": session.is_some(), "sessionId": session}))
        }
        "session.rename" => {
            let id = str_param(params, "sessionId")?;
            let name = str_param(params, "name")?;
            engine.rename_session(id, name).map(ok).map_err(|e| e.to_string())
        }
        "session.delete" => {
            let id = str_param(params, "sessionId")?;
            engine.delete_session(id).map(ok).map_err(|e| e.to_string())
        }
        "session.restore" => {
            let id = str_param(params, "sessionId")?;
            let outcome = engine.restore_session(id).await.map_err(|e| e.to_string())?;
            Ok(match outcome {
                None => ok(false),
                Some(RestoreOutcome::Focused { group_id }) => {
                    json!({"ok": true, "focused": true, "groupId": group_id})
                }
                Some(RestoreOutcome::Restored { group_id, created, failed }) => {
                    json!({"ok": true, "focused": false, "groupId": group_id, "created": created, "failed": failed})
                }
                Some(RestoreOutcome::NothingRestored { failed }) => {
                    json!({"ok": false, "failed": failed})
                }
            })
        }

        // ─── Selection ───
        "selection.click" => {
            let tab: TabId = param(params, "tabId")?;
            let kind: ClickKind = params
                .get("kind")
                .map(|v| serde_json::from_value(v.clone()).map_err(|e| format!("invalid kind: {}", e)))
                .transpose()?
                .unwrap_or(ClickKind::Plain);
            Ok(ok(engine.click(tab, kind)))
        }
        "selection.clear" => {
            engine.clear_selection();
            Ok(ok(true))
        }
        "focus.move" => {
            let direction: FocusDirection = param(params, "direction")?;
            let focused = engine.move_focus(direction).map_err(|e| e.to_string())?;
            Ok(json!({"ok": focused.is_some(), "focused": focused}))
        }

        // ─── Settings ───
        "settings.get" => Ok(json!(engine.settings())),
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            engine.set_setting(key, value).map_err(|e| e.to_string())?;
            Ok(json!(engine.settings()))
        }
        "settings.reset" => {
            engine.reset_settings().map_err(|e| e.to_string())?;
            Ok(json!(engine.settings()))
        }

        // ─── Backup ───
        "backup.export" => {
            let backup = engine.export_backup().map_err(|e| e.to_string())?;
            Ok(json!(backup))
        }
        "backup.import" => {
            let backup: Backup = param(params, "backup")?;
            engine.import_backup(backup).map_err(|e| e.to_string())?;
            Ok(ok(true))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
