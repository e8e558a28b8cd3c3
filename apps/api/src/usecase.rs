//! # ユースケース層
//!
//! ハンドラから呼ばれ、リポジトリを組み合わせて各操作を実行する。
//! 入力はハンドラで検証済みの Draft / Patch を受け取る。

pub mod task;
pub mod user;

pub use task::{TaskUseCaseImpl, TaskWithAssignee};
pub use user::UserUseCaseImpl;
