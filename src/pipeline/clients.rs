use log::debug;

use crate::core::PixMap;

/// Something that draws into the shared backbuffer once per frame.
///
/// Clients share one [`PixMap`] per frame and run in registration order, so a
/// later client paints over an earlier one. Neither call can fail from the
/// host's point of view: a client that hits trouble reports it itself, and a
/// panic ends the frame loop.
pub trait RenderClient {
    /// Called once, before the first frame, with the actual surface size.
    fn init(&mut self, width: i32, height: i32);

    /// Draw this frame. The pixmap is only valid for the duration of the call.
    fn render(&mut self, pixmap: &mut PixMap<'_>);
}

/// Ordered, borrowed set of render clients. The host never owns or drops them.
#[derive(Default)]
pub struct ClientRegistry<'c> {
    clients: Vec<&'c mut dyn RenderClient>,
}

impl<'c> ClientRegistry<'c> {
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
        }
    }

    /// Append a client. The same client registered twice runs twice.
    pub fn register(&mut self, client: &'c mut dyn RenderClient) {
        self.clients.push(client);
        debug!("Registered render client #{}", self.clients.len());
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn init_all(&mut self, width: i32, height: i32) {
        for client in self.clients.iter_mut() {
            client.init(width, height);
        }
    }

    /// Every client gets the same pixmap, in registration order.
    pub fn render_all(&mut self, pixmap: &mut PixMap<'_>) {
        for client in self.clients.iter_mut() {
            client.render(pixmap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pixel;
    use std::cell::RefCell;

    struct Tagger<'l> {
        tag: u32,
        log: &'l RefCell<Vec<u32>>,
    }

    impl RenderClient for Tagger<'_> {
        fn init(&mut self, _width: i32, _height: i32) {}

        fn render(&mut self, pixmap: &mut PixMap<'_>) {
            self.log.borrow_mut().push(self.tag);
            pixmap.set(0, 0, Pixel(self.tag));
        }
    }

    #[test]
    fn renders_in_registration_order_last_one_wins() {
        let log = RefCell::new(Vec::new());
        let mut a = Tagger { tag: 1, log: &log };
        let mut b = Tagger { tag: 2, log: &log };
        let mut c = Tagger { tag: 3, log: &log };
        let mut registry = ClientRegistry::new();
        registry.register(&mut a);
        registry.register(&mut b);
        registry.register(&mut c);
        assert_eq!(registry.len(), 3);

        let mut data = vec![Pixel::BLACK; 4];
        let mut pm = PixMap::new(2, 2, &mut data, 2);
        registry.render_all(&mut pm);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert_eq!(pm.get(0, 0), Some(Pixel(3)));
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let mut registry = ClientRegistry::new();
        assert!(registry.is_empty());
        registry.init_all(10, 10);
        let mut data = vec![Pixel::BLACK; 1];
        let mut pm = PixMap::new(1, 1, &mut data, 1);
        registry.render_all(&mut pm);
        assert_eq!(pm.get(0, 0), Some(Pixel::BLACK));
    }
}
