// In-memory store used by tests and by runs without DATABASE_URL

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::{NewUser, User};
use crate::auth::repository::UserStore;
use crate::posts::models::{NewPost, Post, PostAuthor, PostResponse};
use crate::posts::repository::PostStore;
use crate::store::StoreError;

/// Process-local store implementing both `UserStore` and `PostStore`
///
/// Email uniqueness is checked under the write lock, so it holds even for
/// concurrent inserts.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    posts: RwLock<Vec<Post>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let stored = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(stored.id, stored.clone());

        Ok(stored)
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn list_with_authors(&self) -> Result<Vec<PostResponse>, StoreError> {
        let posts = self.posts.read().await;
        let users = self.users.read().await;

        Ok(posts
            .iter()
            .map(|post| {
                let author = users.get(&post.author_id).map(|u| PostAuthor {
                    id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                });
                PostResponse::new(post.clone(), author)
            })
            .collect())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let now = Utc::now();
        let stored = Post {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: now,
            updated_at: now,
        };
        self.posts.write().await.push(stored.clone());

        Ok(stored)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = InMemoryStore::new();
        let user = UserStore::insert(&store, new_user("a@x.com")).await.unwrap();

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = InMemoryStore::new();
        UserStore::insert(&store, new_user("a@x.com")).await.unwrap();

        assert!(store.find_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let store = InMemoryStore::new();
        UserStore::insert(&store, new_user("a@x.com")).await.unwrap();

        let result = UserStore::insert(&store, new_user("a@x.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_inserts_store_one_user() {
        let store = Arc::new(InMemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { UserStore::insert(&*store, new_user("race@x.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_posts_list_in_insertion_order_with_authors() {
        let store = InMemoryStore::new();
        let author = UserStore::insert(&store, new_user("a@x.com")).await.unwrap();

        for title in ["first", "second"] {
            PostStore::insert(
                &store,
                NewPost {
                    title: title.to_string(),
                    content: "body".to_string(),
                    author_id: author.id,
                },
            )
            .await
            .unwrap();
        }

        let posts = store.list_with_authors().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "first");
        assert_eq!(posts[1].title, "second");
        assert_eq!(posts[0].author.as_ref().unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn test_delete_post() {
        let store = InMemoryStore::new();
        let post = PostStore::insert(
            &store,
            NewPost {
                title: "t".to_string(),
                content: "c".to_string(),
                author_id: Uuid::new_v4(),
            },
        )
        .await
        .unwrap();

        assert!(store.delete_by_id(post.id).await.unwrap());
        assert!(!store.delete_by_id(post.id).await.unwrap());
        assert!(store.list_with_authors().await.unwrap().is_empty());
    }
}
