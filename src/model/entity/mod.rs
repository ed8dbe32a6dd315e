mod user;
pub use user::{User, UserUpdate};

mod post;
pub use post::{POST_LIMIT, POST_LIMIT_WINDOW_DAYS, Post, PostCreate, PostWithAuthor};

mod like;

mod comment;
pub use comment::{Comment, CommentWithAuthor};
