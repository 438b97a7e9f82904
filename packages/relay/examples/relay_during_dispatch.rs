//! Example demonstrating the supported in-dispatch mutations: a listener
//! removing itself and a listener adding a new listener.

use std::cell::RefCell;
use std::rc::Rc;

use relay::{Listener, Relay};

fn main() {
    let tick = Rc::new(Relay::<u32>::new());

    // A listener that unsubscribes itself after the third delivery.
    let seen = Rc::new(RefCell::new(Vec::new()));
    let own_handle = Rc::new(RefCell::new(None::<Listener<u32>>));
    let seen_clone = Rc::clone(&seen);
    let own_handle_clone = Rc::clone(&own_handle);
    let tick_clone = Rc::clone(&tick);
    let transient = Listener::new(move |frame: &u32| {
        seen_clone.borrow_mut().push(*frame);
        if seen_clone.borrow().len() == 3 {
            if let Some(handle) = own_handle_clone.borrow().as_ref() {
                tick_clone.remove_listener(handle);
                println!("transient listener left at frame {frame}");
            }
        }
    });
    *own_handle.borrow_mut() = Some(transient.clone());
    tick.add_listener(transient, false);

    // A listener that recruits a colleague mid-dispatch. The recruit is
    // first delivered to on the dispatch after the one that added it.
    let tick_clone = Rc::clone(&tick);
    tick.add_once(
        Listener::new(move |frame: &u32| {
            let joined_at = *frame;
            tick_clone.add_listener(
                Listener::new(move |frame: &u32| {
                    println!("recruit (joined at {joined_at}) sees frame {frame}");
                }),
                false,
            );
        }),
        false,
    );

    for frame in 0..5 {
        println!("=== frame {frame} ===");
        tick.dispatch(&frame);
    }

    println!("transient listener saw frames {:?}", seen.borrow());
}
