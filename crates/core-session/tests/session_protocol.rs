use core_session::{
    BackendScript, Insertion, ScriptedTransport, Session, SessionEffect, SessionId, SessionStatus,
    SessionTransport, resolve_identity,
};
use core_state::{MessageLevel, StatusMessage};
use pretty_assertions::assert_eq;

fn shell() -> SessionId {
    SessionId::new("shell", "1")
}

fn transport_with(name: &str, script: BackendScript) -> ScriptedTransport {
    let mut t = ScriptedTransport::new();
    t.register(name, script);
    t
}

fn messages(fx: &[SessionEffect]) -> Vec<&StatusMessage> {
    fx.iter()
        .filter_map(|e| match e {
            SessionEffect::Message(m) => Some(m),
            _ => None,
        })
        .collect()
}

#[test]
fn feed_into_dead_session_restarts_with_warning() {
    let mut t = transport_with("shell", BackendScript::default());
    let mut s = Session::new();
    assert_eq!(t.status(&shell()), SessionStatus::Dead);

    let fx = s.feed(shell(), &mut t, "ls");
    assert_eq!(s.status(), SessionStatus::WaitingForOutput);
    let msgs = messages(&fx);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].level, MessageLevel::Warning);
    assert_eq!(msgs[0].text, "Warning: shell has been restarted");
    assert_eq!(msgs[0].detail, "session `1`");

    let state = t.session(&shell()).expect("session started");
    assert_eq!(state.written, vec!["ls".to_string()]);
    assert_eq!(state.restarts, 1);
}

#[test]
fn failed_restart_reports_error_and_returns_to_input() {
    let script = BackendScript {
        start_failure: Some("no such binary".into()),
        ..BackendScript::default()
    };
    let mut t = transport_with("shell", script);
    let mut s = Session::new();

    let fx = s.feed(shell(), &mut t, "ls");
    assert_eq!(s.status(), SessionStatus::Dead);
    assert!(fx.contains(&SessionEffect::EnterInput));
    let msgs = messages(&fx);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].level, MessageLevel::Error);
    assert_eq!(msgs[0].detail, "connect shell");
}

#[test]
fn connect_unknown_backend_is_reported_not_fatal() {
    let mut t = ScriptedTransport::new();
    let mut s = Session::new();
    let fx = s.connect(SessionId::new("maxima", "default"), &mut t);
    let msgs = messages(&fx);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].level, MessageLevel::Error);
    assert_eq!(msgs[0].text, "maxima is not available");
    assert_eq!(s.status(), SessionStatus::Dead);
}

#[test]
fn connect_enters_input_prompt() {
    let mut t = transport_with("shell", BackendScript::default());
    let mut s = Session::new();
    let fx = s.connect(shell(), &mut t);
    assert_eq!(
        fx,
        vec![
            SessionEffect::Message(StatusMessage::info("shell is running...", "session `1`")),
            SessionEffect::EnterInput,
        ]
    );
}

#[test]
fn poll_inserts_output_then_error_and_settles() {
    let script = BackendScript {
        echo: false,
        ..BackendScript::default()
    };
    let mut t = transport_with("shell", script);
    let mut s = Session::new();
    s.connect(shell(), &mut t);
    s.feed(shell(), &mut t, "make");
    t.push_output(&shell(), "building\n");
    t.push_error(&shell(), "warning: unused\n");

    let fx = s.poll(shell(), &mut t);
    assert_eq!(
        fx,
        vec![
            SessionEffect::Insert(Insertion::Output("building\n".into())),
            SessionEffect::Message(StatusMessage::info("shell is running...", "session `1`")),
            SessionEffect::Insert(Insertion::Error("warning: unused\n".into())),
            SessionEffect::Message(StatusMessage::info("shell is running...", "session `1`")),
            SessionEffect::EnterInput,
        ]
    );
    assert_eq!(s.status(), SessionStatus::WaitingForInput);
}

#[test]
fn poll_with_no_output_and_dead_backend_completes_task() {
    let script = BackendScript {
        echo: false,
        settle: SessionStatus::Dead,
        ..BackendScript::default()
    };
    let mut t = transport_with("shell", script);
    let mut s = Session::new();
    s.connect(shell(), &mut t);
    s.feed(shell(), &mut t, "exit");

    let fx = s.poll(shell(), &mut t);
    assert_eq!(
        fx,
        vec![
            SessionEffect::EnterInput,
            SessionEffect::Message(StatusMessage::info(
                "shell has completed its task",
                "session `1`"
            )),
        ]
    );
    assert_eq!(s.status(), SessionStatus::Dead);
}

#[test]
fn poll_while_held_produces_nothing() {
    let mut t = transport_with("shell", BackendScript::default());
    let mut s = Session::new();
    s.connect(shell(), &mut t);
    s.feed(shell(), &mut t, "sleep 10");
    t.set_hold(&shell(), true);
    assert!(s.poll(shell(), &mut t).is_empty());
    assert!(s.busy(shell(), &t));
}

#[test]
fn poll_is_noop_when_not_waiting_for_output() {
    let mut t = transport_with("shell", BackendScript::default());
    let mut s = Session::new();
    s.connect(shell(), &mut t);
    assert!(s.poll(shell(), &mut t).is_empty());
}

#[test]
fn interrupt_only_effective_while_computing() {
    let mut t = transport_with("shell", BackendScript::default());
    let mut s = Session::new();
    s.connect(shell(), &mut t);
    assert!(!s.interrupt(shell(), &mut t));

    s.feed(shell(), &mut t, "loop");
    t.set_hold(&shell(), true);
    assert!(s.interrupt(shell(), &mut t));
    assert_eq!(s.status(), SessionStatus::WaitingForInput);
    assert_eq!(t.session(&shell()).map(|x| x.interrupts), Some(1));
}

#[test]
fn stop_is_ignored_for_dead_session() {
    let mut t = transport_with("shell", BackendScript::default());
    let mut s = Session::new();
    assert!(!s.stop(shell(), &mut t));
    s.connect(shell(), &mut t);
    assert!(s.stop(shell(), &mut t));
    assert_eq!(s.status(), SessionStatus::Dead);
}

#[test]
fn feed_while_busy_does_not_write() {
    let mut t = transport_with("shell", BackendScript::default());
    let mut s = Session::new();
    s.connect(shell(), &mut t);
    s.feed(shell(), &mut t, "first");
    t.set_hold(&shell(), true);
    let fx = s.feed(shell(), &mut t, "second");
    assert!(fx.is_empty());
    assert_eq!(
        t.session(&shell()).map(|x| x.written.clone()),
        Some(vec!["first".to_string()])
    );
}

#[test]
fn identity_follows_environment() {
    let mut t = ScriptedTransport::new();
    t.register("shell", BackendScript::default());
    t.register("python", BackendScript::default());
    let mut s = Session::new();

    let env_a = |var: &str| match var {
        "prog-language" => "shell".to_string(),
        "this-session" => "1".to_string(),
        _ => String::new(),
    };
    let env_b = |var: &str| match var {
        "prog-language" => "python".to_string(),
        "this-session" => "default".to_string(),
        _ => String::new(),
    };

    s.connect(resolve_identity(env_a), &mut t);
    s.feed(resolve_identity(env_a), &mut t, "x");
    t.set_hold(&shell(), true);
    assert!(s.busy(resolve_identity(env_a), &t));

    // Switching backend through the environment re-reads status for the new id.
    assert!(!s.busy(resolve_identity(env_b), &t));
    assert_eq!(s.id(), &SessionId::new("python", "default"));
    assert_eq!(s.status(), SessionStatus::Dead);
}
