pub mod article;
pub mod loaders;

pub use article::{create_url, ArticleRow, Classification, WorkItem, MAINTAINED_MARKER};
pub use loaders::{load_rows, parse_rows};
