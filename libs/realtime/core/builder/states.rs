//! Type-state markers for [`ChannelBuilder`](super::ChannelBuilder)
//!
//! A channel cannot be built until both the endpoint and the subscriber set
//! are known; the compiler enforces it through these markers.

use std::marker::PhantomData;

/// Marker trait for URL state
pub trait UrlState {}

/// URL has not been set
pub struct NoUrl;
impl UrlState for NoUrl {}

/// URL has been set
pub struct HasUrl;
impl UrlState for HasUrl {}

/// Marker trait for subscriber state
pub trait SubscriberState {}

/// Subscribers have not been set
pub struct NoSubscribers;
impl SubscriberState for NoSubscribers {}

/// Subscribers have been set
pub struct HasSubscribers;
impl SubscriberState for HasSubscribers {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<U, S> {
    _url: PhantomData<U>,
    _subscribers: PhantomData<S>,
}

impl<U, S> TypeState<U, S> {
    pub(crate) fn new() -> Self {
        Self {
            _url: PhantomData,
            _subscribers: PhantomData,
        }
    }
}
