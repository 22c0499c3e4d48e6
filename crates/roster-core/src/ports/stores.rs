use std::sync::{Arc, Weak};

use super::UserRepository;

/// Collection of entity stores shared by the application.
///
/// Stores that need their siblings receive a [`Weak`] handle to the
/// collection when it is built with [`Stores::new_cyclic`].
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    /// Build the collection, handing each store a handle back to it.
    pub fn new_cyclic<F>(users: F) -> Arc<Self>
    where
        F: FnOnce(Weak<Stores>) -> Arc<dyn UserRepository>,
    {
        Arc::new_cyclic(|stores| Self {
            users: users(stores.clone()),
        })
    }
}
