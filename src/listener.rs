//! Scoped event-listener subscriptions.
//!
//! Sensors that react to window events (resize, scroll, pointer) register a
//! handler through a [`ListenerHost`] and keep the returned [`Subscription`]
//! for as long as the owning component lives. Dropping the subscription
//! removes the handler, so navigating away never leaks listeners.

pub trait ListenerHost {
    type Handle;

    /// Registers `handler` for `event`. Returns `None` when the host cannot
    /// accept listeners (for example outside a browser).
    fn attach(&self, event: &'static str, handler: Box<dyn FnMut()>) -> Option<Self::Handle>;

    fn detach(&self, event: &'static str, handle: Self::Handle);
}

#[must_use = "dropping a subscription detaches its handler immediately"]
pub struct Subscription<H: ListenerHost> {
    host: H,
    event: &'static str,
    handle: Option<H::Handle>,
}

impl<H: ListenerHost> Subscription<H> {
    pub fn attach(host: H, event: &'static str, handler: impl FnMut() + 'static) -> Self {
        let handle = host.attach(event, Box::new(handler));
        Self {
            host,
            event,
            handle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl<H: ListenerHost> Drop for Subscription<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.host.detach(self.event, handle);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ListenerHost;
    use std::{cell::RefCell, rc::Rc};

    type Handler = (usize, &'static str, Box<dyn FnMut()>);

    /// In-memory host that stores handlers and lets tests fire events.
    #[derive(Clone, Default)]
    pub struct FakeHost {
        handlers: Rc<RefCell<Vec<Handler>>>,
        next_id: Rc<RefCell<usize>>,
        refuse: bool,
    }

    impl FakeHost {
        pub fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::default()
            }
        }

        pub fn live_listeners(&self) -> usize {
            self.handlers.borrow().len()
        }

        pub fn fire(&self, event: &str) {
            for (_, name, handler) in self.handlers.borrow_mut().iter_mut() {
                if *name == event {
                    handler();
                }
            }
        }
    }

    impl ListenerHost for FakeHost {
        type Handle = usize;

        fn attach(&self, event: &'static str, handler: Box<dyn FnMut()>) -> Option<usize> {
            if self.refuse {
                return None;
            }

            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            self.handlers.borrow_mut().push((*next_id, event, handler));
            Some(*next_id)
        }

        fn detach(&self, _event: &'static str, handle: usize) {
            self.handlers.borrow_mut().retain(|(id, _, _)| *id != handle);
        }
    }
}
