pub mod comment_bank;
pub mod final_comment;
