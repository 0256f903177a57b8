use crate::errors::{AppError, AppResult};
use crate::models::Task;
use crate::store::TaskStore;
use crate::utils::date::{now_ms, parse_date};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Raw entries of an import file plus the document-level session date.
/// Both the export document and a bare task array are accepted.
pub fn parse_document(content: &str) -> AppResult<(Vec<Value>, Option<NaiveDate>)> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AppError::Validation(format!("import file is not valid JSON: {e}")))?;

    match value {
        Value::Array(entries) => Ok((entries, None)),
        Value::Object(mut map) => {
            let session = map
                .get("sessionDate")
                .and_then(Value::as_str)
                .and_then(parse_date);
            match map.remove("tasks") {
                Some(Value::Array(entries)) => Ok((entries, session)),
                _ => Err(AppError::Validation(
                    "import document has no 'tasks' array".into(),
                )),
            }
        }
        _ => Err(AppError::Validation(
            "import file must be a document or an array of tasks".into(),
        )),
    }
}

/// One import entry, or the reason it is skipped.
fn validate_entry(entry: Value, session: Option<NaiveDate>) -> Result<Task, String> {
    let obj = entry.as_object().ok_or("entry is not an object")?;

    match obj.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => {}
        _ => return Err("missing id".into()),
    }
    match obj.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => {}
        _ => return Err("missing or empty name".into()),
    }
    if !obj.get("duration").is_some_and(Value::is_number) {
        return Err("duration is not a number".into());
    }

    let mut task: Task = serde_json::from_value(entry).map_err(|e| e.to_string())?;
    if task.session_date.is_none() {
        task.session_date = session;
    }
    let now = now_ms();
    if task.created_at == 0 {
        task.created_at = now;
    }
    if task.updated_at == 0 {
        task.updated_at = task.created_at;
    }
    Ok(task)
}

/// Map every node id of `task` to `root_id`.
fn claim_ids(task: &Task, root_id: &str, owners: &mut HashMap<String, String>) {
    owners.insert(task.id.clone(), root_id.to_string());
    for sub in &task.subtasks {
        claim_ids(sub, root_id, owners);
    }
}

/// An entry may replace the root carrying its id, but none of its node ids
/// may belong to another tree or appear twice inside the entry.
fn check_ids(task: &Task, owners: &HashMap<String, String>) -> Result<(), String> {
    let mut seen = HashSet::new();
    let mut stack = vec![task];
    while let Some(node) = stack.pop() {
        if !seen.insert(node.id.as_str()) {
            return Err(format!("id {} appears twice in the entry", node.id));
        }
        if let Some(owner) = owners.get(&node.id)
            && owner != &task.id
        {
            return Err(format!("id {} is already used inside task {}", node.id, owner));
        }
        stack.extend(node.subtasks.iter());
    }
    Ok(())
}

/// Insert new ids, update existing roots, count invalid entries.
///
/// Every entry is checked before anything is written; the accepted ones are
/// committed in a single batch so a failing store leaves nothing behind.
pub async fn import_document<S: TaskStore + ?Sized>(store: &S, content: &str) -> AppResult<ImportReport> {
    let (entries, session) = parse_document(content)?;
    let mut report = ImportReport::default();

    let mut owners = HashMap::new();
    for root in store.list_all().await? {
        claim_ids(&root, &root.id, &mut owners);
    }

    let mut batch = Vec::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        let checked = validate_entry(entry, session).and_then(|t| check_ids(&t, &owners).map(|_| t));
        let task = match checked {
            Ok(t) => t,
            Err(reason) => {
                log::warn!("import: skipping entry #{idx}: {reason}");
                report.skipped += 1;
                continue;
            }
        };

        if owners.contains_key(&task.id) {
            // the replaced tree gives its ids back
            owners.retain(|_, owner| *owner != task.id);
            report.updated += 1;
        } else {
            report.inserted += 1;
        }
        claim_ids(&task, &task.id, &mut owners);
        batch.push(task);
    }

    store.overwrite_all(batch).await?;
    Ok(report)
}
