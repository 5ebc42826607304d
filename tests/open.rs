use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parsetree_inspector::error::MarshalingError;
use parsetree_inspector::inspector::WindowSet;
use parsetree_inspector::open::{
    HeadlessUi, UiDispatcher, WindowPhase, open_until_closed, ui_channel,
};
use parsetree_inspector::{NodeLabel, ParseTree, RuleNames, Session, SourceTree, open};

fn session() -> Session {
    let tree = ParseTree::rule(0, vec![ParseTree::token("a"), ParseTree::error("b")]);
    let root: Arc<dyn SourceTree> = Arc::new(tree);
    Session::new(root, RuleNames::new(vec!["prog".into()]))
}

#[test]
fn open_resolves_once_visible_not_on_close() {
    let ui = HeadlessUi::spawn().unwrap();
    let handle = open(ui.dispatcher(), session()).unwrap().wait().unwrap();
    assert_eq!(handle.phase(), WindowPhase::Shown);
    assert!(handle.is_visible());
    assert!(!handle.is_closed());
    assert!(!handle.wait_closed_timeout(Duration::from_millis(50)));

    handle.request_close(ui.dispatcher()).unwrap();
    assert!(handle.wait_closed_timeout(Duration::from_secs(5)));
    assert!(handle.is_closed());
    ui.shutdown();
}

#[test]
fn open_from_worker_thread() {
    let ui = HeadlessUi::spawn().unwrap();
    let dispatcher = ui.dispatcher().clone();
    let handle = thread::spawn(move || open(&dispatcher, session()).and_then(|f| f.wait()))
        .join()
        .unwrap()
        .unwrap();
    assert!(handle.is_visible());
    ui.shutdown();
    assert!(handle.is_closed(), "shutting the UI down closes its windows");
}

#[test]
fn concurrent_opens_are_independent() {
    let ui = HeadlessUi::spawn().unwrap();
    let first = open(ui.dispatcher(), session()).unwrap();
    let second = open(ui.dispatcher(), session()).unwrap();
    let a = first.wait().unwrap();
    let b = second.wait().unwrap();
    assert_ne!(a.id(), b.id());

    a.request_close(ui.dispatcher()).unwrap();
    assert!(a.wait_closed_timeout(Duration::from_secs(5)));
    assert!(b.is_visible(), "closing one inspector leaves the other open");
    ui.shutdown();
}

#[test]
fn open_without_ui_thread_fails_immediately() {
    let ui = HeadlessUi::spawn().unwrap();
    let dispatcher = ui.dispatcher().clone();
    ui.shutdown();
    assert_eq!(open(&dispatcher, session()).err(), Some(MarshalingError::Unavailable));
}

#[test]
fn invoke_and_wait_reports_panics() {
    let ui = HeadlessUi::spawn().unwrap();
    let res: Result<(), _> = ui
        .dispatcher()
        .invoke_and_wait(|_| panic!("surface construction blew up"));
    match res {
        Err(MarshalingError::Construction(msg)) => assert!(msg.contains("blew up")),
        other => panic!("unexpected {other:?}"),
    }
    // The UI thread survives and keeps serving.
    let n = ui.dispatcher().invoke_and_wait(|windows| windows.len()).unwrap();
    assert_eq!(n, 0);
    ui.shutdown();
}

#[test]
fn queue_runs_tasks_on_draining_thread() {
    let (dispatcher, queue) = ui_channel();
    let mut windows = WindowSet::new();
    dispatcher.submit(|w| assert!(w.is_empty())).unwrap();
    let drained = queue.run_pending(&mut windows);
    assert_eq!(drained.ran, 1);
    assert!(!drained.shutdown);
    assert!(dispatcher.is_ui_thread());
    assert!(matches!(
        dispatcher.invoke_and_wait(|_| ()),
        Err(MarshalingError::Construction(_))
    ));
    drop(queue);
    assert!(!dispatcher.is_available());
    assert_eq!(dispatcher.submit(|_| ()), Err(MarshalingError::Unavailable));
}

/// A source tree whose traversal blows up, so building the window fails.
struct BrokenTree;

impl SourceTree for BrokenTree {
    fn child_count(&self) -> usize {
        panic!("source tree went away")
    }
    fn child_at(&self, _index: usize) -> Option<&dyn SourceTree> {
        None
    }
    fn label(&self) -> NodeLabel<'_> {
        NodeLabel::Rule(0)
    }
    fn is_error_flagged(&self) -> bool {
        false
    }
}

fn wait_unavailable(dispatcher: &UiDispatcher, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while dispatcher.is_available() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
    true
}

#[test]
fn failed_open_still_stops_the_ui_thread() {
    let ui = HeadlessUi::spawn().unwrap();
    let dispatcher = ui.dispatcher().clone();
    let broken = Session::new(Arc::new(BrokenTree), RuleNames::default());
    let res = open_until_closed(&dispatcher, broken);
    assert!(matches!(res, Err(MarshalingError::Construction(_))), "got {res:?}");
    assert!(wait_unavailable(&dispatcher, Duration::from_secs(5)));
    ui.shutdown();
}

#[test]
fn open_until_closed_returns_after_close() {
    let ui = HeadlessUi::spawn().unwrap();
    let dispatcher = ui.dispatcher().clone();
    let closer = ui.dispatcher().clone();
    let waiter = thread::spawn(move || open_until_closed(&dispatcher, session()));
    // Close whatever window appears first.
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let closed = closer
            .invoke_and_wait(|windows| {
                let id = windows.iter().next().map(|w| w.id());
                id.is_some_and(|id| windows.close(id))
            })
            .unwrap_or(false);
        if closed || Instant::now() >= deadline {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(waiter.join().unwrap(), Ok(()));
    assert!(wait_unavailable(&closer, Duration::from_secs(5)));
    ui.shutdown();
}
