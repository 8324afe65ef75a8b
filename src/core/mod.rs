pub mod gallery;
pub mod storage;
pub mod studio;
pub mod taste;
