//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Cascading deletes resolve
//! their descendant id sets up front and delete leaf-first inside a single
//! transaction, so a partial failure can never leave a dangling mid-tree
//! reference.

pub mod caption_repo;
pub mod category_repo;
pub mod kb_repo;
pub mod project_repo;
pub mod region_repo;
pub mod review_repo;
pub mod segment_repo;
pub mod subpart_repo;
pub mod tag_repo;
pub mod video_repo;

pub use caption_repo::CaptionRepo;
pub use category_repo::CategoryRepo;
pub use kb_repo::KbRepo;
pub use project_repo::ProjectRepo;
pub use region_repo::RegionRepo;
pub use review_repo::ReviewRepo;
pub use segment_repo::SegmentRepo;
pub use subpart_repo::SubpartRepo;
pub use tag_repo::TagRepo;
pub use video_repo::VideoRepo;
