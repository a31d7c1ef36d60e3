use crate::client::ClientError;
use crate::task::{Bucket, NewTask, Task, TaskId, ValidationError};
use chrono::{DateTime, Local};
use tracing::{error, info, warn};

/// A single remote call requested by the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch,
    Create(NewTask),
    Update(Task),
    Delete(TaskId),
}

/// Completion of a [`Command`], carrying what is needed to reconcile.
#[derive(Debug)]
pub enum BoardEvent {
    Fetched(Result<Vec<Task>, ClientError>),
    Created(Result<Task, ClientError>),
    Updated(Task, Result<(), ClientError>),
    Deleted(TaskId, Result<(), ClientError>),
}

/// Client-side cache of the remote task set plus the create form.
///
/// `tasks` is the only mutable collection; buckets are derived from each
/// task's `status` whenever they are read.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    tasks: Vec<Task>,
    pub draft: NewTask,
    fetched: bool,
    last_synced: Option<DateTime<Local>>,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fetch-all issued on start. Yields a command only the first time.
    pub fn initial_fetch(&mut self) -> Option<Command> {
        if self.fetched {
            return None;
        }
        self.fetched = true;
        Some(Command::Fetch)
    }

    pub fn create(&self) -> Result<Command, ValidationError> {
        self.draft.validate()?;
        Ok(Command::Create(self.draft.clone()))
    }

    pub fn drop_on(&self, task: &Task, target: Bucket) -> Command {
        Command::Update(task.moved_to(target))
    }

    pub fn delete(&self, id: &TaskId) -> Command {
        Command::Delete(id.clone())
    }

    pub fn apply(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Fetched(Ok(tasks)) => {
                self.replace_all(tasks);
                self.touch();
            }
            BoardEvent::Fetched(Err(err)) => {
                error!(error = %err, "error fetching tasks");
            }
            BoardEvent::Created(Ok(mut task)) => {
                if task.bucket() != Some(Bucket::Todo) {
                    warn!(id = %task.id, status = %task.status, "created task placed in To Do");
                    task.status = Bucket::Todo.label().to_string();
                }
                info!(id = %task.id, "task created");
                self.remove(&task.id);
                self.tasks.push(task);
                self.draft = NewTask::default();
                self.touch();
            }
            BoardEvent::Created(Err(err)) => {
                error!(error = %err, "error creating task");
            }
            BoardEvent::Updated(task, Ok(())) => {
                info!(id = %task.id, status = %task.status, "task moved");
                self.remove(&task.id);
                self.tasks.push(task);
                self.touch();
            }
            BoardEvent::Updated(task, Err(err)) => {
                error!(id = %task.id, error = %err, "error updating task");
            }
            BoardEvent::Deleted(id, Ok(())) => {
                info!(id = %id, "task deleted");
                self.remove(&id);
                self.touch();
            }
            BoardEvent::Deleted(id, Err(err)) => {
                error!(id = %id, error = %err, "error deleting task");
            }
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == bucket.label())
            .collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn last_synced(&self) -> Option<DateTime<Local>> {
        self.last_synced
    }

    fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut kept: Vec<Task> = Vec::with_capacity(tasks.len());
        for task in tasks {
            if kept.iter().any(|t| t.id == task.id) {
                warn!(id = %task.id, "duplicate task id in fetch, keeping first");
                continue;
            }
            kept.push(task);
        }
        let hidden = kept.iter().filter(|t| t.bucket().is_none()).count();
        if hidden > 0 {
            warn!(hidden, "tasks with an unknown status are not shown");
        }
        info!(count = kept.len(), "tasks loaded");
        self.tasks = kept;
    }

    fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| &t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    fn touch(&mut self) {
        self.last_synced = Some(Local::now());
    }
}
