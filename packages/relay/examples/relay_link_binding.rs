//! Example demonstrating the ownership split between a relay's producer and
//! its consumers, using a link and a binding.

use relay::{Listener, Relay, RelayLink};

/// The producer owns the relay and is the only party able to dispatch.
struct Doorbell {
    pressed: Relay<()>,
}

impl Doorbell {
    fn new() -> Self {
        Self {
            pressed: Relay::new(),
        }
    }

    /// Consumers get the dispatch-incapable facade.
    fn pressed(&self) -> &RelayLink<()> {
        self.pressed.link()
    }

    fn press(&self) {
        self.pressed.dispatch(&());
    }
}

fn main() {
    let doorbell = Doorbell::new();

    doorbell
        .pressed()
        .add_listener(Listener::new(|()| println!("ding dong")), false);

    // A binding remembers the listener handle so toggling needs no
    // bookkeeping on the consumer side.
    let mut dog = doorbell
        .pressed()
        .bind_listener(Listener::new(|()| println!("woof woof woof")), false)
        .expect("listener is not yet subscribed");

    println!("=== The dog is home ===");
    doorbell.press();

    dog.enable(false);
    println!("=== The dog is out ===");
    doorbell.press();

    dog.enable(true);
    println!("=== The dog is back ===");
    doorbell.press();
}
