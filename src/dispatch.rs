use crate::client::TaskApi;
use crate::kanban_board::{BoardEvent, Command};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

/// Runs board commands against the remote store. Each command turns into
/// exactly one call and exactly one [`BoardEvent`] on the shared queue, so
/// the event loop applies completions one at a time.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn TaskApi>,
    events: mpsc::Sender<BoardEvent>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn TaskApi>, events: mpsc::Sender<BoardEvent>) -> Self {
        Self { api, events }
    }

    pub fn dispatch(&self, command: Command) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = execute(api.as_ref(), command).await;
            if events.send(event).await.is_err() {
                warn!("event queue closed, completion dropped");
            }
        })
    }
}

pub async fn execute(api: &dyn TaskApi, command: Command) -> BoardEvent {
    match command {
        Command::Fetch => BoardEvent::Fetched(api.list().await),
        Command::Create(draft) => BoardEvent::Created(api.create(&draft).await),
        Command::Update(task) => {
            let result = api.update(&task.id, &task).await;
            BoardEvent::Updated(task, result)
        }
        Command::Delete(id) => {
            let result = api.delete(&id).await;
            BoardEvent::Deleted(id, result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, MockTaskApi};
    use crate::kanban_board::KanbanBoard;
    use crate::task::{Bucket, Task, TaskId};
    use reqwest::{Method, StatusCode, Url};
    use serde_json::json;

    fn task(id: i64, title: &str, status: &str) -> Task {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "description": "y",
            "status": status,
        }))
        .unwrap()
    }

    fn network_error(method: Method) -> ClientError {
        ClientError::Status {
            method,
            url: Url::parse("http://localhost:8080/api/v1/tasks/1").unwrap(),
            status: StatusCode::BAD_GATEWAY,
        }
    }

    async fn run(api: MockTaskApi, board: &mut KanbanBoard, command: Command) {
        let (tx, mut rx) = mpsc::channel(8);
        let dispatcher = Dispatcher::new(Arc::new(api), tx);
        dispatcher.dispatch(command).await.unwrap();
        let event = rx.recv().await.unwrap();
        board.apply(event);
        assert!(rx.try_recv().is_err(), "one command, one completion");
    }

    async fn loaded(tasks: Vec<Task>) -> KanbanBoard {
        let mut api = MockTaskApi::new();
        api.expect_list().times(1).returning(move || Ok(tasks.clone()));
        let mut board = KanbanBoard::new();
        let fetch = board.initial_fetch().unwrap();
        run(api, &mut board, fetch).await;
        board
    }

    #[tokio::test]
    async fn fetch_on_start_fills_todo() {
        let board = loaded(vec![task(1, "x", "To Do")]).await;
        assert_eq!(board.bucket(Bucket::Todo).len(), 1);
        assert!(board.bucket(Bucket::InProgress).is_empty());
        assert!(board.bucket(Bucket::Done).is_empty());
    }

    #[tokio::test]
    async fn create_issues_one_call_and_appends_to_todo() {
        let mut board = loaded(vec![task(1, "x", "To Do")]).await;
        board.draft.title = "a".into();
        board.draft.description = "b".into();
        board.draft.status = "Done".into();

        let mut api = MockTaskApi::new();
        api.expect_create()
            .withf(|draft| draft.title == "a" && draft.description == "b")
            .times(1)
            .returning(|_| Ok(task(2, "a", "To Do")));
        let create = board.create().unwrap();
        run(api, &mut board, create).await;

        let todo: Vec<&TaskId> = board.bucket(Bucket::Todo).into_iter().map(|t| &t.id).collect();
        assert_eq!(todo, vec![&TaskId::Number(1), &TaskId::Number(2)]);
        assert_eq!(board.draft.title, "");
        assert_eq!(board.draft.description, "");
        assert_eq!(board.draft.status, "To Do");
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_api() {
        let mut board = loaded(vec![task(1, "x", "To Do")]).await;
        board.draft.description = "b".into();
        assert!(board.create().is_err());
        assert_eq!(board.tasks().len(), 1);
    }

    #[tokio::test]
    async fn drop_issues_update_with_target_label() {
        let mut board = loaded(vec![task(1, "x", "To Do")]).await;
        let dragged = board.find(&TaskId::Number(1)).unwrap().clone();

        let mut api = MockTaskApi::new();
        api.expect_update()
            .withf(|id, task| *id == TaskId::Number(1) && task.status == "Done")
            .times(1)
            .returning(|_, _| Ok(()));
        let update = board.drop_on(&dragged, Bucket::Done);
        run(api, &mut board, update).await;

        assert!(board.bucket(Bucket::Todo).is_empty());
        let done = board.bucket(Bucket::Done);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, TaskId::Number(1));
        assert_eq!(done[0].status, "Done");
    }

    #[tokio::test]
    async fn failed_drop_keeps_task_in_origin() {
        let mut board = loaded(vec![task(1, "x", "To Do")]).await;
        let dragged = board.find(&TaskId::Number(1)).unwrap().clone();

        let mut api = MockTaskApi::new();
        api.expect_update()
            .times(1)
            .returning(|_, _| Err(network_error(Method::PUT)));
        let update = board.drop_on(&dragged, Bucket::InProgress);
        run(api, &mut board, update).await;

        assert_eq!(board.bucket(Bucket::Todo).len(), 1);
        assert!(board.bucket(Bucket::InProgress).is_empty());
    }

    #[tokio::test]
    async fn delete_removes_task_on_success() {
        let mut board = loaded(vec![task(1, "x", "Done")]).await;
        let mut api = MockTaskApi::new();
        api.expect_delete()
            .withf(|id| *id == TaskId::Number(1))
            .times(1)
            .returning(|_| Ok(()));
        let delete = board.delete(&TaskId::Number(1));
        run(api, &mut board, delete).await;
        assert!(board.tasks().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_task() {
        let mut board = loaded(vec![task(1, "x", "To Do")]).await;
        let mut api = MockTaskApi::new();
        api.expect_delete()
            .times(1)
            .returning(|_| Err(network_error(Method::DELETE)));
        let delete = board.delete(&TaskId::Number(1));
        run(api, &mut board, delete).await;
        assert_eq!(board.bucket(Bucket::Todo).len(), 1);
    }

    #[tokio::test]
    async fn completion_is_dropped_quietly_when_queue_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut api = MockTaskApi::new();
        api.expect_list().times(1).returning(|| Ok(Vec::new()));
        let dispatcher = Dispatcher::new(Arc::new(api), tx);
        assert!(dispatcher.dispatch(Command::Fetch).await.is_ok());
    }
}
