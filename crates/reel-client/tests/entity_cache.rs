//! End-to-end tests for the entity store, relationship fetches and client
//! wiring, using scripted collaborator fakes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reel_client::{
    ApiError, Chat, Client, ClientError, DirectApi, EntityStore, FeedApi, FeedPage, FriendshipApi,
    Message, RawUser,
};

fn raw(pk: &str, username: &str) -> RawUser {
    RawUser {
        pk: pk.to_string(),
        username: Some(username.to_string()),
        full_name: None,
        biography: None,
        is_private: None,
        is_verified: None,
        is_business: None,
        media_count: None,
        profile_pic_url: None,
        follower_count: None,
        following_count: None,
        total_igtv_videos: None,
    }
}

fn page(items: Vec<RawUser>, next_max_id: Option<&str>) -> FeedPage {
    FeedPage {
        items,
        next_max_id: next_max_id.map(String::from),
    }
}

/// Feed fake that replays pre-scripted page results and records the cursors
/// it was asked for. An exhausted script yields empty final pages.
#[derive(Default)]
struct ScriptedFeed {
    follower_pages: Mutex<VecDeque<Result<FeedPage, ApiError>>>,
    following_pages: Mutex<VecDeque<Result<FeedPage, ApiError>>>,
    follower_cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedFeed {
    fn script_followers(&self, pages: Vec<Result<FeedPage, ApiError>>) {
        self.follower_pages.lock().unwrap().extend(pages);
    }

    fn script_following(&self, pages: Vec<Result<FeedPage, ApiError>>) {
        self.following_pages.lock().unwrap().extend(pages);
    }

    fn follower_cursors(&self) -> Vec<Option<String>> {
        self.follower_cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedApi for ScriptedFeed {
    async fn account_followers(
        &self,
        _user_id: &str,
        max_id: Option<&str>,
    ) -> Result<FeedPage, ApiError> {
        self.follower_cursors
            .lock()
            .unwrap()
            .push(max_id.map(String::from));
        self.follower_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(page(vec![], None)))
    }

    async fn account_following(
        &self,
        _user_id: &str,
        _max_id: Option<&str>,
    ) -> Result<FeedPage, ApiError> {
        self.following_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(page(vec![], None)))
    }
}

#[derive(Default)]
struct NoopFriendships;

#[async_trait]
impl FriendshipApi for NoopFriendships {
    async fn create(&self, _user_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
    async fn destroy(&self, _user_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
    async fn block(&self, _user_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
    async fn unblock(&self, _user_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
    async fn approve(&self, _user_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
    async fn deny(&self, _user_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
    async fn remove_follower(&self, _user_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Direct-message fake that records every send.
#[derive(Default)]
struct RecordingDirect {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingDirect {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectApi for RecordingDirect {
    async fn send_text(&self, thread_id: &str, text: &str) -> Result<Message, ApiError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((thread_id.to_string(), text.to_string()));
        Ok(Message {
            id: format!("m{}", sent.len()),
            thread_id: thread_id.to_string(),
            text: text.to_string(),
            sent_at: chrono::Utc::now(),
        })
    }
}

#[tokio::test]
async fn fetch_accumulates_across_calls() {
    let store = EntityStore::new();
    let user = store.upsert_user(&raw("u", "watched")).await.unwrap();

    let feed = ScriptedFeed::default();
    feed.script_followers(vec![Ok(page(vec![raw("A", "ana"), raw("B", "ben")], None))]);

    let first = user.fetch_followers(&store, &feed).await.unwrap();
    assert_eq!(first.len(), 2);

    // The second pass returns B (renamed) and C; A disappeared server-side
    // but stays in the view.
    feed.script_followers(vec![Ok(page(
        vec![raw("B", "ben_renamed"), raw("C", "cara")],
        None,
    ))]);

    let second = user.fetch_followers(&store, &feed).await.unwrap();
    assert_eq!(second.len(), 3);

    let mut ids: Vec<_> = second.iter().map(|u| u.id().to_string()).collect();
    ids.sort();
    assert_eq!(ids, ["A", "B", "C"]);

    // B is the single canonical instance, field-updated to the second
    // payload.
    let b_in_view = user.follower("B").unwrap();
    let b_in_store = store.user("B").unwrap();
    assert!(Arc::ptr_eq(&b_in_view, &b_in_store));
    assert_eq!(
        b_in_view.profile().await.username.as_deref(),
        Some("ben_renamed")
    );
}

#[tokio::test]
async fn fetch_walks_pagination_cursors() {
    let store = EntityStore::new();
    let user = store.upsert_user(&raw("u", "watched")).await.unwrap();

    let feed = ScriptedFeed::default();
    feed.script_followers(vec![
        Ok(page(vec![raw("A", "ana")], Some("cursor-1"))),
        Ok(page(vec![raw("B", "ben")], Some("cursor-2"))),
        Ok(page(vec![raw("C", "cara")], None)),
    ]);

    let followers = user.fetch_followers(&store, &feed).await.unwrap();

    assert_eq!(followers.len(), 3);
    assert_eq!(
        feed.follower_cursors(),
        vec![
            None,
            Some("cursor-1".to_string()),
            Some("cursor-2".to_string())
        ]
    );
}

#[tokio::test]
async fn fetch_following_fills_the_following_view() {
    let store = EntityStore::new();
    let user = store.upsert_user(&raw("u", "watched")).await.unwrap();

    let feed = ScriptedFeed::default();
    feed.script_following(vec![Ok(page(vec![raw("A", "ana")], None))]);

    let following = user.fetch_following(&store, &feed).await.unwrap();

    assert_eq!(following.len(), 1);
    assert_eq!(following[0].id(), "A");
    assert!(user.followee("A").is_some());
    // The followers view stays untouched.
    assert!(user.followers().is_empty());
    assert!(user.follower("A").is_none());
}

#[tokio::test]
async fn failed_page_keeps_earlier_entries() {
    let store = EntityStore::new();
    let user = store.upsert_user(&raw("u", "watched")).await.unwrap();

    let feed = ScriptedFeed::default();
    feed.script_followers(vec![
        Ok(page(vec![raw("A", "ana")], Some("cursor-1"))),
        Err(ApiError::Network("connection reset".to_string())),
    ]);

    let err = user.fetch_followers(&store, &feed).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ApiError::Network(_))));

    // Entries from the page that succeeded stay in the view and the store.
    assert_eq!(user.followers().len(), 1);
    assert!(store.user("A").is_some());
}

#[tokio::test]
async fn views_share_the_canonical_entity() {
    let store = EntityStore::new();
    let alice = store.upsert_user(&raw("a", "alice")).await.unwrap();
    let bob = store.upsert_user(&raw("b", "bob")).await.unwrap();

    let feed = ScriptedFeed::default();
    // X follows alice, and bob follows X.
    feed.script_followers(vec![Ok(page(vec![raw("x", "xavier")], None))]);
    feed.script_following(vec![Ok(page(vec![raw("x", "xavier")], None))]);

    alice.fetch_followers(&store, &feed).await.unwrap();
    bob.fetch_following(&store, &feed).await.unwrap();

    let via_alice = alice.follower("x").unwrap();
    let via_bob = bob.followee("x").unwrap();
    assert!(Arc::ptr_eq(&via_alice, &via_bob));
    assert!(Arc::ptr_eq(&via_alice, &store.user("x").unwrap()));
}

#[tokio::test]
async fn client_wires_store_and_collaborators() {
    let feed = Arc::new(ScriptedFeed::default());
    let direct = Arc::new(RecordingDirect::default());
    let client = Client::new(Arc::new(NoopFriendships), feed.clone(), direct.clone());

    let user = client.upsert_user(&raw("1", "alice")).await.unwrap();
    feed.script_followers(vec![Ok(page(vec![raw("2", "bob")], None))]);

    let followers = client.fetch_followers(&user).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert!(Arc::ptr_eq(&followers[0], &client.store().user("2").unwrap()));

    client
        .store()
        .insert_chat(Chat::new("dm-1", vec!["1".to_string()]));
    let message = client.send_to(&user, "hello").await.unwrap();
    assert_eq!(message.thread_id, "dm-1");
    assert_eq!(direct.sent(), vec![("dm-1".to_string(), "hello".to_string())]);

    client.shutdown();
    assert_eq!(client.store().user_count(), 0);
    assert_eq!(client.store().chat_count(), 0);
}

#[tokio::test]
async fn send_without_thread_reaches_no_collaborator() {
    let direct = Arc::new(RecordingDirect::default());
    let client = Client::new(
        Arc::new(NoopFriendships),
        Arc::new(ScriptedFeed::default()),
        direct.clone(),
    );

    let user = client.upsert_user(&raw("1", "alice")).await.unwrap();
    let err = client.send_to(&user, "hello").await.unwrap_err();

    assert!(matches!(err, ClientError::ConversationNotFound(ref id) if id == "1"));
    assert!(direct.sent().is_empty());
}
