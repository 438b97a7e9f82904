//! Example demonstrating basic relay usage: persistent and once listeners.

use relay::{Listener, Relay};

fn main() {
    // One argument: the points scored. Use a tuple for more arguments.
    let scored = Relay::<u32>::new();

    let announcer = Listener::new(|points: &u32| {
        println!("announcer: {points} points!");
    });
    scored.add_listener(announcer.clone(), false);

    // A once listener is removed automatically after one delivery.
    scored.add_once(
        Listener::new(|points: &u32| {
            println!("first blood bonus for the {points}-point opener");
        }),
        false,
    );

    println!("=== First dispatch ===");
    scored.dispatch(&10);

    println!("=== Second dispatch ===");
    scored.dispatch(&3);

    scored.remove_listener(&announcer);

    println!("=== Third dispatch (no listeners) ===");
    scored.dispatch(&7);

    println!(
        "persistent: {}, once: {}",
        scored.listener_count(),
        scored.once_listener_count()
    );
}
