//! Example demonstrating the subscription tracker. Requires the `tracker`
//! feature; run in a debug build with `RUST_BACKTRACE=1` to see where each
//! listener was added.

use relay::tracker::RelayTracker;
use relay::{Listener, Relay};

fn main() {
    let tracker = RelayTracker::new();
    tracker.install();

    let damaged = Relay::<u32>::new();
    let healed = Relay::<u32>::new();

    damaged.add_listener(Listener::labeled("hud", |amount| {
        println!("hud: -{amount}");
    }), false);
    damaged.add_listener(Listener::labeled("audio", |_: &u32| {
        println!("audio: ouch");
    }), false);
    healed.add_listener(Listener::labeled("hud", |amount| {
        println!("hud: +{amount}");
    }), false);

    // An unsubscribed listener leaves no record behind.
    let transient = Listener::labeled("tutorial", |_: &u32| {});
    damaged.add_listener(transient.clone(), false);
    damaged.remove_listener(&transient);

    damaged.dispatch(&25);
    healed.dispatch(&10);

    println!("\n=== everything ===\n{}", tracker.report());
    println!("=== hud only ===\n{}", tracker.report_for("hud"));

    RelayTracker::uninstall();
}
