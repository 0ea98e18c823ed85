use crate::models;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct CommentNode {
    pub id: i32,
    pub user_id: i32,
    pub author_name: String,
    pub parent_id: Option<i32>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub replies: Vec<CommentNode>,
}

impl From<models::BuildCommentWithAuthor> for CommentNode {
    fn from(comment: models::BuildCommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            user_id: comment.user_id,
            author_name: comment.author_name,
            parent_id: comment.parent_id,
            text: comment.text,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            replies: vec![],
        }
    }
}

/// Arranges flat comments (ordered by creation) into top-level threads with
/// their replies. Replies whose parent is missing are dropped.
pub fn tree(comments: Vec<models::BuildCommentWithAuthor>) -> Vec<CommentNode> {
    let mut replies: HashMap<i32, Vec<CommentNode>> = HashMap::new();
    let mut roots = vec![];

    for comment in comments {
        match comment.parent_id {
            Some(parent_id) => replies
                .entry(parent_id)
                .or_default()
                .push(CommentNode::from(comment)),
            None => roots.push(CommentNode::from(comment)),
        }
    }

    for root in roots.iter_mut() {
        if let Some(children) = replies.remove(&root.id) {
            root.replies = children;
        }
    }

    roots
}
