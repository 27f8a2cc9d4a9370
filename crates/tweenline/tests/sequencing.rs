//! Sequence composition: step ordering, parallel groups, overflow carry
//! between steps, step events, looping and the sequence-level lifecycle.

use std::cell::RefCell;
use std::rc::Rc;

use tweenline::{
    Parent, Playable, PropertyBag, Sequence, State, TickSource, Ticker, Tween,
};

fn shared_bag(entries: impl IntoIterator<Item = (&'static str, f32)>) -> Rc<RefCell<PropertyBag>> {
    Rc::new(RefCell::new(entries.into_iter().collect()))
}

#[test]
fn overflow_carries_from_interval_into_tween() {
    let target = shared_bag([("x", 0.0)]);
    let updates = Rc::new(RefCell::new(0));
    let counter = updates.clone();

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append_interval(1.0)
            .append(Tween::new(target.clone(), ["x"]).to([("x", 1.0)], 1.0))
            .on_update(move |_, _| *counter.borrow_mut() += 1),
    );
    handle.borrow_mut().start().unwrap();

    // One big delta: the interval consumes 1.0 and the remaining 1.0
    // finishes the tween within the same tick.
    ticker.tick(2.0);
    assert_eq!(target.borrow().get("x"), Some(1.0));
    assert_eq!(handle.borrow().state(), State::Finished);
    assert_eq!(handle.borrow().elapsed(), 2.0);
    // The sequence update fires once per host tick, not once per consumed
    // step.
    assert_eq!(*updates.borrow(), 1);
}

#[test]
fn joined_playables_advance_in_parallel() {
    let target = shared_bag([("x", 0.0), ("y", 0.0)]);
    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append(Tween::new(target.clone(), ["x"]).to([("x", 10.0)], 1.0))
            .join(Tween::new(target.clone(), ["y"]).to([("y", 10.0)], 1.0)),
    );
    handle.borrow_mut().start().unwrap();

    ticker.tick(0.5);
    assert_eq!(target.borrow().get("x"), Some(5.0));
    assert_eq!(target.borrow().get("y"), Some(5.0));

    ticker.tick(0.5);
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn unequal_join_members_finish_the_group_together() {
    let target = shared_bag([("x", 0.0), ("y", 0.0)]);
    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append(Tween::new(target.clone(), ["x"]).to([("x", 10.0)], 1.0))
            .join(Tween::new(target.clone(), ["y"]).to([("y", 10.0)], 2.0)),
    );
    handle.borrow_mut().start().unwrap();

    ticker.tick(1.0);
    assert_eq!(target.borrow().get("x"), Some(10.0));
    assert_eq!(target.borrow().get("y"), Some(5.0));
    assert_eq!(handle.borrow().state(), State::Running);

    // The finished member holds its terminal state while its sibling keeps
    // running; the group completes when the longest member does.
    ticker.tick(1.0);
    assert_eq!(target.borrow().get("y"), Some(10.0));
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn loop_wrap_carries_overflow_into_elapsed() {
    let mut ticker = Ticker::new("main");
    let handle = ticker.add(Sequence::new().append_interval(1.0).loops(2));
    handle.borrow_mut().start().unwrap();

    // 1.5 = the whole first iteration plus 0.5 into the second; elapsed
    // reads time within the current iteration.
    ticker.tick(1.5);
    assert_eq!(handle.borrow().state(), State::Running);
    assert_eq!(handle.borrow().elapsed(), 0.5);

    ticker.tick(0.5);
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn one_tick_crosses_interval_callback_and_tween() {
    let target = shared_bag([("x", 0.0)]);
    let fired = Rc::new(RefCell::new(0));
    let counter = fired.clone();

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append_interval(0.5)
            .append_callback(move || *counter.borrow_mut() += 1)
            .append(Tween::new(target.clone(), ["x"]).to([("x", 10.0)], 0.5)),
    );
    handle.borrow_mut().start().unwrap();

    ticker.tick(1.0);
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(target.borrow().get("x"), Some(10.0));
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn prepend_runs_before_appended_steps() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let appended = order.clone();
    let prepended = order.clone();

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append_callback(move || appended.borrow_mut().push("appended"))
            .prepend_callback(move || prepended.borrow_mut().push("prepended")),
    );
    handle.borrow_mut().start().unwrap();

    // A callback keeps the whole delta as overflow, so both steps chain
    // within this one tick.
    ticker.tick(0.1);
    assert_eq!(*order.borrow(), ["prepended", "appended"]);
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn step_events_fire_once_per_step() {
    let target = shared_bag([("x", 0.0)]);
    let starts = Rc::new(RefCell::new(0));
    let ends = Rc::new(RefCell::new(0));
    let start_counter = starts.clone();
    let end_counter = ends.clone();

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append_interval(0.5)
            .append(Tween::new(target, ["x"]).to([("x", 10.0)], 0.5))
            .on_step_start(move |_| *start_counter.borrow_mut() += 1)
            .on_step_end(move |_| *end_counter.borrow_mut() += 1),
    );
    handle.borrow_mut().start().unwrap();

    ticker.tick(1.0);
    assert_eq!(*starts.borrow(), 2);
    assert_eq!(*ends.borrow(), 2);
}

#[test]
fn sequence_loops_replay_every_step() {
    let fired = Rc::new(RefCell::new(0));
    let counter = fired.clone();
    let completions = Rc::new(RefCell::new(0));
    let completed = completions.clone();

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append_interval(1.0)
            .append_callback(move || *counter.borrow_mut() += 1)
            .loops(2)
            .on_complete(move || *completed.borrow_mut() += 1),
    );
    handle.borrow_mut().start().unwrap();

    // First iteration: the interval consumes the whole tick exactly, the
    // callback waits for the next one.
    ticker.tick(1.0);
    assert_eq!(*fired.borrow(), 0);

    // The callback fires and its overflow wraps the loop into the second
    // iteration, landing halfway through the interval.
    ticker.tick(0.5);
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(handle.borrow().state(), State::Running);

    // Second iteration finishes with overflow reaching the callback again.
    ticker.tick(1.0);
    assert_eq!(*fired.borrow(), 2);
    assert_eq!(handle.borrow().state(), State::Finished);
    assert_eq!(*completions.borrow(), 1);
}

#[test]
fn sequences_nest() {
    let target = shared_bag([("x", 0.0)]);
    let inner = Sequence::new()
        .append(Tween::new(target.clone(), ["x"]).to([("x", 10.0)], 1.0));

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(Sequence::new().append_interval(1.0).append(inner));
    handle.borrow_mut().start().unwrap();

    ticker.tick(2.0);
    assert_eq!(target.borrow().get("x"), Some(10.0));
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn skip_finishes_remaining_steps() {
    let target = shared_bag([("x", 0.0)]);
    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append_interval(1.0)
            .append(Tween::new(target.clone(), ["x"]).to([("x", 10.0)], 1.0)),
    );
    handle.borrow_mut().start().unwrap();

    // Into the tween, then jump to the end.
    ticker.tick(1.2);
    assert_eq!(handle.borrow().state(), State::Running);
    handle.borrow_mut().skip();

    assert_eq!(target.borrow().get("x"), Some(10.0));
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn skip_drives_unreached_steps_through_activation() {
    let target = shared_bag([("x", 0.0)]);
    let starts = Rc::new(RefCell::new(0));
    let ends = Rc::new(RefCell::new(0));
    let start_counter = starts.clone();
    let end_counter = ends.clone();

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new()
            .append_interval(1.0)
            .append(Tween::new(target.clone(), ["x"]).to([("x", 10.0)], 1.0))
            .on_step_start(move |_| *start_counter.borrow_mut() += 1)
            .on_step_end(move |_| *end_counter.borrow_mut() += 1),
    );
    handle.borrow_mut().start().unwrap();

    // No tick delivered yet: every step is still idle. Skip starts each
    // one before finishing it, so terminal values and step events land.
    handle.borrow_mut().skip();
    assert_eq!(target.borrow().get("x"), Some(10.0));
    assert_eq!(handle.borrow().state(), State::Finished);
    assert_eq!(*starts.borrow(), 2);
    assert_eq!(*ends.borrow(), 2);
}

#[test]
fn killing_a_sequence_kills_its_children() {
    let target = shared_bag([("x", 0.0)]);
    let child_kills = Rc::new(RefCell::new(0));
    let counter = child_kills.clone();

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(
        Sequence::new().append(
            Tween::new(target, ["x"])
                .to([("x", 10.0)], 1.0)
                .on_killed(move || *counter.borrow_mut() += 1),
        ),
    );
    handle.borrow_mut().start().unwrap();
    ticker.tick(0.3);

    handle.borrow_mut().kill();
    assert_eq!(*child_kills.borrow(), 1);
    assert_eq!(handle.borrow().state(), State::Killed);

    // Idempotent at the sequence level too.
    handle.borrow_mut().kill();
    assert_eq!(*child_kills.borrow(), 1);
}

#[test]
fn sequence_tick_listeners_fire_most_recent_first() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let first = order.clone();
    let second = order.clone();

    let mut sequence = Sequence::new().append_interval(1.0);
    sequence.set_parent(Parent::Ticker);
    let first_id = sequence.add_tick_listener(Box::new(move |_| first.borrow_mut().push("first")));
    sequence.add_tick_listener(Box::new(move |_| second.borrow_mut().push("second")));

    sequence.start().unwrap();
    sequence.tick(0.1);
    assert_eq!(*order.borrow(), ["second", "first"]);

    order.borrow_mut().clear();
    sequence.remove_tick_listener(first_id);
    sequence.tick(0.1);
    assert_eq!(*order.borrow(), ["second"]);
}

#[test]
fn clear_returns_the_sequence_to_defaults() {
    let mut sequence = Sequence::new().append_interval(1.0).append_interval(1.0);
    assert_eq!(sequence.step_count(), 2);

    sequence.clear();
    assert_eq!(sequence.step_count(), 0);
    assert_eq!(sequence.state(), State::Idle);
    assert_eq!(sequence.elapsed(), 0.0);
}

#[test]
fn empty_sequence_completes_on_first_tick() {
    let mut ticker = Ticker::new("main");
    let handle = ticker.add(Sequence::new());
    handle.borrow_mut().start().unwrap();

    ticker.tick(0.1);
    assert_eq!(handle.borrow().state(), State::Finished);
}

#[test]
fn into_sequence_wraps_a_tween() {
    let target = shared_bag([("x", 0.0)]);
    let sequence = Tween::new(target.clone(), ["x"])
        .to([("x", 10.0)], 1.0)
        .into_sequence()
        .append_interval(0.5);
    assert_eq!(sequence.step_count(), 2);

    let mut ticker = Ticker::new("main");
    let handle = ticker.add(sequence);
    handle.borrow_mut().start().unwrap();

    ticker.tick(1.0);
    assert_eq!(target.borrow().get("x"), Some(10.0));
    ticker.tick(0.5);
    assert_eq!(handle.borrow().state(), State::Finished);
}
