#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Post,
    Like,
    Comment,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}
