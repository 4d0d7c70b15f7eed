//! # tetrasoft-body
//!
//! A deformable body driven by XPBD over a coarse tetrahedral mesh and
//! rendered through a separate, denser visual mesh.
//!
//! ```text
//! let mut body = SoftBody::load(asset_dir, &visual, XpbdConfig::default())?;
//! loop {
//!     body.step(&mut visual)?;   // simulate, then rewrite visual positions
//!     render(&visual);
//! }
//! ```

pub mod asset;
pub mod soft_body;

pub use asset::{tetra_path, visual_path};
pub use soft_body::SoftBody;
