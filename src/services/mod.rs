pub mod dispatcher;
pub mod droid;
pub mod extractor;
pub mod page_fetcher;
pub mod pipeline;

pub use dispatcher::*;
pub use droid::*;
pub use extractor::*;
pub use page_fetcher::*;
pub use pipeline::*;
