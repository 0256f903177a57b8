//! Task hierarchy resolver.
//!
//! Roots are the only unit of storage. A subtask is addressed by a
//! [`TaskPath`] (root position + child indices) resolved against a snapshot
//! of the store; every write goes "mutate the node in the root, overwrite the
//! root". There is no subtree write path.

use crate::errors::{AppError, AppResult};
use crate::models::Task;
use crate::store::TaskStore;

/// Location of a task inside a list of roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPath {
    pub root: usize,
    pub children: Vec<usize>,
}

impl TaskPath {
    pub fn is_root(&self) -> bool {
        self.children.is_empty()
    }
}

/// Borrowed view of a resolved task.
#[derive(Debug, Clone, Copy)]
pub struct TaskContext<'a> {
    pub task: &'a Task,
    /// `None` for root tasks.
    pub parent: Option<&'a Task>,
    /// Always set, equal to `task` for roots.
    pub root: &'a Task,
}

fn search_children(node: &Task, id: &str, trail: &mut Vec<usize>) -> bool {
    for (i, child) in node.subtasks.iter().enumerate() {
        trail.push(i);
        if child.id == id || search_children(child, id, trail) {
            return true;
        }
        trail.pop();
    }
    false
}

/// Find `id` among `roots`: a root-level match wins, otherwise each root's
/// subtree is searched depth-first in array order and the first hit returned.
pub fn locate(roots: &[Task], id: &str) -> Option<TaskPath> {
    if let Some(root) = roots.iter().position(|t| t.id == id) {
        return Some(TaskPath {
            root,
            children: Vec::new(),
        });
    }

    for (root, task) in roots.iter().enumerate() {
        let mut trail = Vec::new();
        if search_children(task, id, &mut trail) {
            return Some(TaskPath {
                root,
                children: trail,
            });
        }
    }
    None
}

pub fn node_at<'a>(root: &'a Task, children: &[usize]) -> Option<&'a Task> {
    children
        .iter()
        .try_fold(root, |node, &i| node.subtasks.get(i))
}

pub fn node_at_mut<'a>(root: &'a mut Task, children: &[usize]) -> Option<&'a mut Task> {
    children
        .iter()
        .try_fold(root, |node, &i| node.subtasks.get_mut(i))
}

/// `{task, parent, root}` for `id`, or `None` when no node carries it.
pub fn find_context<'a>(roots: &'a [Task], id: &str) -> Option<TaskContext<'a>> {
    let path = locate(roots, id)?;
    let root = roots.get(path.root)?;
    let task = node_at(root, &path.children)?;
    let parent = match path.children.split_last() {
        Some((_, up)) => Some(node_at(root, up)?),
        None => None,
    };
    Some(TaskContext { task, parent, root })
}

/// Owned resolution result: the current root record plus the path inside it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub root: Task,
    pub children: Vec<usize>,
}

impl Resolved {
    pub fn is_root(&self) -> bool {
        self.children.is_empty()
    }

    pub fn task(&self) -> &Task {
        // the path was produced against this very root
        node_at(&self.root, &self.children).unwrap_or(&self.root)
    }

    pub fn parent(&self) -> Option<&Task> {
        let (_, up) = self.children.split_last()?;
        node_at(&self.root, up)
    }
}

/// Resolve `id` against the store's current state.
pub async fn resolve<S: TaskStore + ?Sized>(store: &S, id: &str) -> AppResult<Option<Resolved>> {
    if let Some(root) = store.get(id).await? {
        return Ok(Some(Resolved {
            root,
            children: Vec::new(),
        }));
    }

    let mut roots = store.list_all().await?;
    let Some(path) = locate(&roots, id) else {
        return Ok(None);
    };
    let root = roots.swap_remove(path.root);
    Ok(Some(Resolved {
        root,
        children: path.children,
    }))
}

pub async fn resolve_required<S: TaskStore + ?Sized>(store: &S, id: &str) -> AppResult<Resolved> {
    resolve(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))
}

/// Read-modify-write of a single node.
///
/// Loads the current root, applies `f` to the node, refreshes `updated_at`
/// on the node and on the root, then overwrites the root. Returns the saved
/// root together with `f`'s result.
pub async fn update_node<S, F, T>(store: &S, id: &str, f: F) -> AppResult<(Task, T)>
where
    S: TaskStore + ?Sized,
    F: FnOnce(&mut Task) -> AppResult<T>,
{
    let Resolved { mut root, children } = resolve_required(store, id).await?;

    let node = node_at_mut(&mut root, &children).ok_or_else(|| AppError::NotFound(id.to_string()))?;
    let out = f(node)?;
    node.touch();
    if !children.is_empty() {
        root.touch();
    }

    let saved = store.overwrite(root).await?;
    Ok((saved, out))
}

/// Append `subtask` under `parent_id` (which may itself be a subtask).
pub async fn insert_subtask<S: TaskStore + ?Sized>(
    store: &S,
    parent_id: &str,
    subtask: Task,
) -> AppResult<Task> {
    if find_in_store(store, &subtask.id).await? {
        return Err(AppError::DuplicateKey(subtask.id));
    }
    let (root, _) = update_node(store, parent_id, |parent| {
        parent.subtasks.push(subtask);
        Ok(())
    })
    .await?;
    Ok(root)
}

/// Splice a subtask out of its parent and re-persist the root.
/// Returns the updated root and the removed subtask.
pub async fn remove_subtask<S: TaskStore + ?Sized>(store: &S, id: &str) -> AppResult<(Task, Task)> {
    let Resolved { mut root, children } = resolve_required(store, id).await?;

    let Some((&last, up)) = children.split_last() else {
        return Err(AppError::Validation(format!(
            "{id} is a top-level task, not a subtask"
        )));
    };

    let parent = node_at_mut(&mut root, up).ok_or_else(|| AppError::NotFound(id.to_string()))?;
    let removed = parent.subtasks.remove(last);
    parent.touch();
    if !up.is_empty() {
        root.touch();
    }

    let saved = store.overwrite(root).await?;
    Ok((saved, removed))
}

async fn find_in_store<S: TaskStore + ?Sized>(store: &S, id: &str) -> AppResult<bool> {
    Ok(resolve(store, id).await?.is_some())
}
