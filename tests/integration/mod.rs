//! Integration tests combining multiple components through their public
//! APIs, without the full `Channel`'s background plumbing threads.

mod registry;
