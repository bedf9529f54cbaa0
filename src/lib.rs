//! This "library" build is here as a hack for loading unit tests to run on local arch, without depending on any hardware-related stuff.
//! (This is necessary as main.rs is inherently hardware-related code.)
//! See the `run-tests` script in the project root for more information.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

#[allow(dead_code, unused_imports)]
mod chord;
#[allow(dead_code, unused_imports)]
mod compose;
#[allow(dead_code, unused_imports)]
mod decode;
#[allow(dead_code, unused_imports)]
mod engine;
#[allow(dead_code, unused_imports)]
mod keycode;
#[allow(dead_code, unused_imports)]
mod keymap;
#[allow(dead_code, unused_imports)]
mod report;
#[allow(dead_code, unused_imports)]
mod status;
#[allow(dead_code, unused_imports)]
mod transport;
