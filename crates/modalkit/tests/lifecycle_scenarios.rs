//! End-to-end lifecycle, focus and dismissal scenarios against a headless
//! document.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use modalkit::{LifecycleState, Modal, ModalProps, render_fn};
use modalkit_core::{
    Document, FocusChange, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent,
    MouseEventKind, NodeId, NodeRef,
};

// ── Helpers ──────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(log: &Log, entry: &'static str) -> impl Fn() + 'static {
    let log = Rc::clone(log);
    move || log.borrow_mut().push(entry.to_owned())
}

/// Props wired so every callback appends its name to `log`.
fn recorded(is_open: bool, log: &Log) -> ModalProps {
    let (esc, overlay) = (Rc::clone(log), Rc::clone(log));
    ModalProps::new(is_open)
        .on_open(push(log, "open"))
        .on_closed(push(log, "closed"))
        .on_close(push(log, "close"))
        .on_escape_key_down(move |_| esc.borrow_mut().push("escape".to_owned()))
        .on_overlay_click(move |_| overlay.borrow_mut().push("overlay".to_owned()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

fn focusable_input(doc: &Document) -> NodeId {
    let input = doc.create_element("input");
    doc.set_focusable(input, true).unwrap();
    input
}

// ═════════════════════════════════════════════════════════════════════════
// Visibility edges
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn on_open_fires_once_per_rising_edge() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(true, &log));
    modal.render(recorded(true, &log));
    modal.render(recorded(true, &log));
    assert_eq!(entries(&log), vec!["open"]);
    assert_eq!(modal.state(), LifecycleState::Open);
}

#[test]
fn on_closed_fires_once_per_falling_edge() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(false, &log));
    assert!(entries(&log).is_empty(), "no on_closed at mount");

    modal.render(recorded(true, &log));
    modal.render(recorded(false, &log));
    modal.render(recorded(false, &log));
    modal.render(recorded(true, &log));
    modal.render(recorded(false, &log));
    assert_eq!(entries(&log), vec!["open", "closed", "open", "closed"]);
}

#[test]
fn closed_modal_has_no_nodes_and_no_listener() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(true, &log).should_close_on_esc(true).content("hello"));
    assert!(doc.node_count() > 1);
    assert_eq!(doc.key_listener_count(), 1);

    let view = modal.render(recorded(false, &log).should_close_on_esc(true));
    assert!(view.is_none());
    assert_eq!(doc.node_count(), 1);
    assert_eq!(doc.key_listener_count(), 0);
    assert_eq!(modal.root(), None);
}

// ═════════════════════════════════════════════════════════════════════════
// Escape dismissal
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn escape_while_closed_does_nothing() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(false, &log).should_close_on_esc(true));
    let ev = doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert!(entries(&log).is_empty());
    assert!(!ev.is_default_prevented());
}

#[test]
fn escape_while_open_requests_close_once_per_press() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(true, &log).should_close_on_esc(true));
    log.borrow_mut().clear();

    let ev = doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert!(ev.is_propagation_stopped());
    assert!(ev.is_default_prevented());
    assert_eq!(entries(&log), vec!["escape", "close"]);

    doc.dispatch_key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
    doc.dispatch_key(KeyEvent::new(KeyCode::Char('q')));
    assert_eq!(entries(&log), vec!["escape", "close"]);

    doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert_eq!(entries(&log), vec!["escape", "close", "escape", "close"]);
}

#[test]
fn dismissal_callbacks_receive_the_dispatched_event() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let keys = Rc::new(RefCell::new(Vec::new()));
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let (k, c) = (Rc::clone(&keys), Rc::clone(&clicks));

    let view = modal
        .render(
            ModalProps::new(true)
                .should_close_on_esc(true)
                .on_escape_key_down(move |ev| k.borrow_mut().push(*ev))
                .on_overlay_click(move |ev| c.borrow_mut().push(*ev)),
        )
        .unwrap();

    let press = KeyEvent::new(KeyCode::Escape).with_modifiers(Modifiers::SHIFT);
    let dispatched = doc.dispatch_key(press);
    assert_eq!(*keys.borrow(), vec![press]);
    assert_eq!(dispatched.event, press);
    assert!(dispatched.is_propagation_stopped());
    assert!(dispatched.is_default_prevented());

    doc.click(view.overlay.node);
    assert_eq!(*clicks.borrow(), vec![MouseEvent::click(view.overlay.node)]);
}

#[test]
fn escape_disabled_invokes_nothing() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(true, &log));
    log.borrow_mut().clear();
    let ev = doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert!(entries(&log).is_empty());
    assert!(!ev.is_propagation_stopped());
    assert_eq!(doc.key_listener_count(), 0);
}

#[test]
fn host_ignoring_close_request_keeps_modal_open() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(true, &log).should_close_on_esc(true));
    doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    modal.render(recorded(true, &log).should_close_on_esc(true));

    assert!(modal.is_open());
    assert_eq!(entries(&log), vec!["open", "escape", "close"]);
    assert_eq!(doc.key_listener_count(), 1);
}

// ═════════════════════════════════════════════════════════════════════════
// Overlay clicks
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn outside_click_without_close_flag_only_reports_overlay_click() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    let view = modal.render(recorded(true, &log)).unwrap();
    log.borrow_mut().clear();
    doc.click(view.overlay.node);
    assert_eq!(entries(&log), vec!["overlay"]);
}

#[test]
fn outside_click_with_close_flag_requests_close() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    let view = modal
        .render(recorded(true, &log).should_close_on_overlay_click(true))
        .unwrap();
    log.borrow_mut().clear();
    doc.click(view.overlay.node);
    assert_eq!(entries(&log), vec!["overlay", "close"]);
}

#[test]
fn clicks_inside_content_are_ignored() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();
    let button = NodeRef::new();
    let slot = button.clone();
    let content = render_fn(move |doc: &Document, parent| {
        let p = doc.append_element(parent, "p")?;
        let b = doc.append_element(p, "button")?;
        slot.set(Some(b));
        Ok(())
    });

    let view = modal
        .render(
            recorded(true, &log)
                .should_close_on_overlay_click(true)
                .title("Inside")
                .content(content),
        )
        .unwrap();
    log.borrow_mut().clear();

    doc.click(button.get().unwrap());
    doc.click(view.surface.node);
    doc.click(view.content.node);
    doc.click(view.title.unwrap().node);
    assert!(entries(&log).is_empty());
}

#[test]
fn only_clicks_are_classified() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    let view = modal
        .render(recorded(true, &log).should_close_on_overlay_click(true))
        .unwrap();
    log.borrow_mut().clear();
    for kind in [MouseEventKind::Down(MouseButton::Left), MouseEventKind::Up(MouseButton::Left)] {
        doc.dispatch_mouse(MouseEvent::new(kind, view.overlay.node));
    }
    assert!(entries(&log).is_empty());
}

#[test]
fn close_button_requests_close_without_overlay_click() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    let view = modal
        .render(recorded(true, &log).should_close_on_overlay_click(true))
        .unwrap();
    log.borrow_mut().clear();
    let button = view.close_button.expect("close button is on by default");
    assert_eq!(doc.text_content(button.node).unwrap(), "X");

    doc.click(button.node);
    assert_eq!(entries(&log), vec!["close"]);
}

// ═════════════════════════════════════════════════════════════════════════
// Focus
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn initial_focus_is_applied_after_on_open() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let input = NodeRef::new();
    let slot = input.clone();
    let focused_during_open = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&focused_during_open);
    let d = doc.clone();

    let content = render_fn(move |doc: &Document, parent| {
        let node = doc.append_element(parent, "input")?;
        doc.set_focusable(node, true)?;
        slot.set(Some(node));
        Ok(())
    });
    modal.render(
        ModalProps::new(true)
            .should_close_on_esc(true)
            .content(content)
            .initial_focus(input.clone())
            .on_open(move || *seen.borrow_mut() = Some(d.active_element())),
    );

    assert_eq!(*focused_during_open.borrow(), Some(None));
    assert_eq!(doc.active_element(), input.get());
    assert_eq!(doc.key_listener_count(), 1);
}

#[test]
fn unresolvable_initial_focus_leaves_focus_alone() {
    let doc = Document::new();
    let trigger = focusable_input(&doc);
    doc.append_child(doc.body(), trigger).unwrap();
    doc.focus(trigger);

    let detached = focusable_input(&doc);
    let mut modal = Modal::new(&doc);
    modal.render(ModalProps::new(true).initial_focus(NodeRef::to(detached)));
    assert_eq!(doc.active_element(), Some(trigger));

    let mut other = Modal::new(&doc);
    other.render(ModalProps::new(true).initial_focus(NodeRef::new()));
    assert_eq!(doc.active_element(), Some(trigger));
}

#[test]
fn closing_focuses_root_before_unmount() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let log = log();

    modal.render(recorded(true, &log));
    let root = modal.root().unwrap();
    doc.take_focus_log();

    modal.render(recorded(false, &log));
    assert_eq!(entries(&log), vec!["open", "closed"]);
    assert_eq!(
        doc.take_focus_log(),
        vec![FocusChange::FocusGained { id: root }, FocusChange::FocusLost { id: root }]
    );
    assert_eq!(doc.active_element(), None);
}

#[test]
fn on_closed_runs_before_focus_moves_to_root() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);
    let active_in_callback = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&active_in_callback);
    let d = doc.clone();

    modal.render(ModalProps::new(true));
    modal.render(ModalProps::new(false).on_closed(move || *seen.borrow_mut() = Some(d.active_element())));
    assert_eq!(*active_in_callback.borrow(), Some(None));
}

#[test]
fn focus_after_close_disabled_leaves_focus() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);

    modal.render(ModalProps::new(true).focus_after_close(false));
    doc.take_focus_log();
    modal.render(ModalProps::new(false).focus_after_close(false));
    assert!(doc.take_focus_log().is_empty());
}

#[test]
fn trigger_focus_is_restored_when_opted_in() {
    let doc = Document::new();
    let trigger = focusable_input(&doc);
    doc.append_child(doc.body(), trigger).unwrap();
    doc.focus(trigger);

    let mut modal = Modal::new(&doc);
    let props = |open| ModalProps::new(open).restore_trigger_focus(true);
    let view = modal.render(props(true)).unwrap();
    doc.focus(view.surface.node);

    modal.render(props(false));
    assert_eq!(doc.active_element(), Some(trigger));
}

#[test]
fn trigger_is_captured_before_on_open_moves_focus() {
    let doc = Document::new();
    let trigger = focusable_input(&doc);
    doc.append_child(doc.body(), trigger).unwrap();
    doc.focus(trigger);

    let mut modal = Modal::new(&doc);
    let root = NodeRef::new();
    let (slot, d) = (root.clone(), doc.clone());
    let content = render_fn(move |doc: &Document, parent| {
        // Content container sits under the surface root.
        slot.set(doc.parent(parent)?);
        Ok(())
    });
    let surface = root.clone();
    modal.render(
        ModalProps::new(true)
            .restore_trigger_focus(true)
            .content(content)
            .on_open(move || {
                if let Some(node) = surface.get() {
                    d.focus(node);
                }
            }),
    );
    assert_eq!(doc.active_element(), root.get());
    assert!(root.get().is_some());

    modal.render(ModalProps::new(false).restore_trigger_focus(true));
    assert_eq!(doc.active_element(), Some(trigger));
}

// ═════════════════════════════════════════════════════════════════════════
// Host honoring close requests during dispatch
// ═════════════════════════════════════════════════════════════════════════

/// A modal whose `on_close` immediately re-renders it closed, the way a host
/// that owns `is_open` honors the request.
fn self_closing(doc: &Document, escape: bool, overlay: bool) -> (Rc<RefCell<Modal>>, Rc<Cell<u32>>) {
    let modal = Rc::new(RefCell::new(Modal::new(doc)));
    let closed = Rc::new(Cell::new(0));
    let weak = Rc::downgrade(&modal);
    let c = Rc::clone(&closed);
    let props = ModalProps::new(true)
        .should_close_on_esc(escape)
        .should_close_on_overlay_click(overlay)
        .on_close(move || {
            let c = Rc::clone(&c);
            if let Some(modal) = weak.upgrade() {
                modal
                    .borrow_mut()
                    .render(ModalProps::new(false).on_closed(move || c.set(c.get() + 1)));
            }
        });
    modal.borrow_mut().render(props);
    (modal, closed)
}

fn assert_fully_closed(doc: &Document, modal: &Rc<RefCell<Modal>>, closed: &Rc<Cell<u32>>) {
    assert!(!modal.borrow().is_open());
    assert_eq!(closed.get(), 1);
    assert_eq!(doc.key_listener_count(), 0);
    assert_eq!(doc.node_count(), 1);
}

#[test]
fn escape_close_honored_inside_listener() {
    let doc = Document::new();
    let (modal, closed) = self_closing(&doc, true, false);
    assert_eq!(doc.key_listener_count(), 1);

    let ev = doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert!(ev.is_default_prevented());
    assert_fully_closed(&doc, &modal, &closed);

    doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert_eq!(closed.get(), 1);
}

#[test]
fn overlay_close_honored_inside_click() {
    let doc = Document::new();
    let (modal, closed) = self_closing(&doc, false, true);
    let overlay = modal.borrow().view().unwrap().overlay.node;

    doc.click(overlay);
    assert_fully_closed(&doc, &modal, &closed);
    assert!(!doc.exists(overlay));
}

#[test]
fn close_button_close_honored_inside_click() {
    let doc = Document::new();
    let (modal, closed) = self_closing(&doc, true, false);
    let button = modal.borrow().view().and_then(|v| v.close_button).unwrap().node;

    doc.click(button);
    assert_fully_closed(&doc, &modal, &closed);
}

// ═════════════════════════════════════════════════════════════════════════
// Presentation pass-through
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn view_reflects_presentation_and_title_updates_in_place() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);

    let props = |title: &str| {
        ModalProps::new(true)
            .title(title)
            .class_name("confirm")
            .role("dialog")
            .aria_labelled_by("modal-title")
            .aria_described_by("modal-description")
            .style("max-width", "80ch")
            .width("30rem")
    };

    let first = modal.render(props("Delete?")).unwrap();
    assert_eq!(first.surface.class, "modal confirm");
    assert_eq!(first.surface.style.get("width").map(String::as_str), Some("30rem"));
    assert_eq!(first.surface.style.get("max-width").map(String::as_str), Some("80ch"));
    assert_eq!(first.surface.attributes.get("role").map(String::as_str), Some("dialog"));
    let title = first.title.unwrap();
    assert_eq!(title.id.as_deref(), Some("modal-title"));

    let second = modal.render(props("Really delete?")).unwrap();
    assert_eq!(second.title.as_ref().map(|t| t.node), Some(title.node));
    assert_eq!(doc.text_content(title.node).unwrap(), "Really delete?");
}

#[test]
fn custom_close_button_and_content_remount() {
    let doc = Document::new();
    let mut modal = Modal::new(&doc);

    let view = modal
        .render(
            ModalProps::new(true)
                .custom_close_button("Dismiss")
                .content(String::from("v1")),
        )
        .unwrap();
    let button = view.close_button.unwrap().node;
    assert_eq!(doc.text_content(button).unwrap(), "Dismiss");
    assert_eq!(doc.text_content(view.content.node).unwrap(), "v1");

    modal.render(ModalProps::new(true).content(String::from("v2")));
    assert_eq!(doc.text_content(view.content.node).unwrap(), "v1");
    assert!(modal.remount_content());
    assert_eq!(doc.text_content(view.content.node).unwrap(), "v2");
    assert_eq!(doc.text_content(button).unwrap(), "X");
}

// ═════════════════════════════════════════════════════════════════════════
// Unmount
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn dropping_open_modal_releases_everything_silently() {
    let doc = Document::new();
    let log = log();
    let overlay = {
        let mut modal = Modal::new(&doc);
        let view = modal.render(recorded(true, &log).should_close_on_esc(true)).unwrap();
        view.overlay.node
    };
    assert_eq!(entries(&log), vec!["open"]);
    assert_eq!(doc.key_listener_count(), 0);
    assert_eq!(doc.node_count(), 1);
    assert!(!doc.exists(overlay));

    doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert_eq!(entries(&log), vec!["open"]);
}

#[test]
fn two_modals_keep_independent_listeners() {
    let doc = Document::new();
    let (a_log, b_log) = (log(), log());
    let mut a = Modal::new(&doc);
    let mut b = Modal::new(&doc);

    a.render(recorded(true, &a_log).should_close_on_esc(true));
    b.render(recorded(true, &b_log).should_close_on_esc(true));
    assert_eq!(doc.key_listener_count(), 2);

    a.render(recorded(false, &a_log).should_close_on_esc(true));
    assert_eq!(doc.key_listener_count(), 1);
    doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
    assert_eq!(entries(&a_log), vec!["open", "closed"]);
    assert_eq!(entries(&b_log), vec!["open", "escape", "close"]);
}
