//! Pipeline stages for image-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ layout ──▶ render
//! (filter)  (pixels)   (geometry)  (PDF page, atomic write)
//! ```
//!
//! 1. [`input`]  — supported-extension filter, path validation, directory
//!    discovery, header-only dimension read
//! 2. [`decode`] — decode the file into an 8-bit pixel buffer at native
//!    resolution
//! 3. [`layout`] — fit the image into the page's drawable area and centre it
//! 4. [`render`] — draw one page per image and write the document once all
//!    pages are in

pub mod decode;
pub mod input;
pub mod layout;
pub mod render;
