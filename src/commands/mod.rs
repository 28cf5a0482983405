mod collect;
mod summary;

pub use collect::{
    collect,
    repositories_to_collect,
};
pub use summary::summary;
