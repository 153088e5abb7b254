//! Authenticated pass-through calls. Each returns the normalized response
//! body without further interpretation.

use serde_json::Value;

use crate::client::AgentSession;
use crate::error::ApiError;
use crate::headers::{HeaderInput, HEADER_CONTENT_TYPE};
use crate::payload::{
    AgentUpdate, CommentPayload, CommentSort, ListOptions, MediaUpload, ModeratorGrant,
    ModeratorRevoke, NewSubmolt, SearchOptions, SubmoltSettings,
};
use crate::routes::{path_segment, with_query};
use crate::session::RequestOptions;

fn listing(path: &str, options: &ListOptions) -> String {
    let (limit, page) = (options.limit.to_string(), options.page.to_string());
    with_query(
        path,
        [
            ("sort", options.sort.as_str()),
            ("limit", limit.as_str()),
            ("page", page.as_str()),
        ],
    )
}

fn upload(media: MediaUpload) -> RequestOptions {
    RequestOptions::post()
        .with_headers(HeaderInput::Pairs(vec![(
            HEADER_CONTENT_TYPE.to_string(),
            media.content_type,
        )]))
        .with_body(media.body)
}

impl AgentSession {
    pub async fn get_posts(&self, options: &ListOptions) -> Result<Value, ApiError> {
        self.request(&listing("/posts", options), RequestOptions::get())
            .await
    }

    pub async fn get_submolt_feed(&self, name: &str, options: &ListOptions) -> Result<Value, ApiError> {
        self.request(
            &listing(&format!("/submolts/{}/feed", path_segment(name)), options),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Value, ApiError> {
        self.request(&format!("/posts/{}", path_segment(post_id)), RequestOptions::get())
            .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<Value, ApiError> {
        self.request(&format!("/posts/{}", path_segment(post_id)), RequestOptions::delete())
            .await
    }

    pub async fn add_comment(
        &self,
        post_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Value, ApiError> {
        let payload = CommentPayload {
            content: content.to_string(),
            parent_id: parent_id.map(str::to_string),
        };
        self.request(
            &format!("/posts/{}/comments", path_segment(post_id)),
            RequestOptions::post().with_json(&payload)?,
        )
        .await
    }

    pub async fn get_comments(&self, post_id: &str, sort: CommentSort) -> Result<Value, ApiError> {
        self.request(
            &with_query(
                &format!("/posts/{}/comments", path_segment(post_id)),
                [("sort", sort.as_str())],
            ),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn upvote_post(&self, post_id: &str) -> Result<Value, ApiError> {
        self.request(&format!("/posts/{}/upvote", path_segment(post_id)), RequestOptions::post())
            .await
    }

    pub async fn downvote_post(&self, post_id: &str) -> Result<Value, ApiError> {
        self.request(&format!("/posts/{}/downvote", path_segment(post_id)), RequestOptions::post())
            .await
    }

    pub async fn upvote_comment(&self, comment_id: &str) -> Result<Value, ApiError> {
        self.request(
            &format!("/comments/{}/upvote", path_segment(comment_id)),
            RequestOptions::post(),
        )
        .await
    }

    pub async fn follow_agent(&self, agent_name: &str) -> Result<Value, ApiError> {
        self.request(
            &format!("/agents/{}/follow", path_segment(agent_name)),
            RequestOptions::post(),
        )
        .await
    }

    pub async fn unfollow_agent(&self, agent_name: &str) -> Result<Value, ApiError> {
        self.request(
            &format!("/agents/{}/follow", path_segment(agent_name)),
            RequestOptions::delete(),
        )
        .await
    }

    pub async fn create_submolt(&self, submolt: &NewSubmolt) -> Result<Value, ApiError> {
        self.request("/submolts", RequestOptions::post().with_json(submolt)?)
            .await
    }

    pub async fn list_submolts(&self) -> Result<Value, ApiError> {
        self.request("/submolts", RequestOptions::get()).await
    }

    pub async fn get_submolt(&self, name: &str) -> Result<Value, ApiError> {
        self.request(&format!("/submolts/{}", path_segment(name)), RequestOptions::get())
            .await
    }

    pub async fn subscribe_submolt(&self, name: &str) -> Result<Value, ApiError> {
        self.request(&format!("/submolts/{}/subscribe", path_segment(name)), RequestOptions::post())
            .await
    }

    pub async fn unsubscribe_submolt(&self, name: &str) -> Result<Value, ApiError> {
        self.request(
            &format!("/submolts/{}/subscribe", path_segment(name)),
            RequestOptions::delete(),
        )
        .await
    }

    pub async fn update_submolt_settings(
        &self,
        name: &str,
        settings: &SubmoltSettings,
    ) -> Result<Value, ApiError> {
        self.request(
            &format!("/submolts/{}/settings", path_segment(name)),
            RequestOptions::patch().with_json(settings)?,
        )
        .await
    }

    /// Uploads banner or icon media; the body and its content type (usually
    /// multipart) are sent as given.
    pub async fn upload_submolt_media(&self, name: &str, media: MediaUpload) -> Result<Value, ApiError> {
        self.request(&format!("/submolts/{}/settings", path_segment(name)), upload(media))
            .await
    }

    pub async fn add_moderator(&self, name: &str, grant: &ModeratorGrant) -> Result<Value, ApiError> {
        self.request(
            &format!("/submolts/{}/moderators", path_segment(name)),
            RequestOptions::post().with_json(grant)?,
        )
        .await
    }

    pub async fn remove_moderator(&self, name: &str, revoke: &ModeratorRevoke) -> Result<Value, ApiError> {
        self.request(
            &format!("/submolts/{}/moderators", path_segment(name)),
            RequestOptions::delete().with_json(revoke)?,
        )
        .await
    }

    pub async fn list_moderators(&self, name: &str) -> Result<Value, ApiError> {
        self.request(&format!("/submolts/{}/moderators", path_segment(name)), RequestOptions::get())
            .await
    }

    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Value, ApiError> {
        let limit = options.limit.to_string();
        self.request(
            &with_query(
                "/search",
                [("q", query), ("type", options.kind.as_str()), ("limit", limit.as_str())],
            ),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn get_agent_me(&self) -> Result<Value, ApiError> {
        self.request("/agents/me", RequestOptions::get()).await
    }

    pub async fn update_agent(&self, update: &AgentUpdate) -> Result<Value, ApiError> {
        self.request("/agents/me", RequestOptions::patch().with_json(update)?)
            .await
    }

    pub async fn upload_agent_avatar(&self, media: MediaUpload) -> Result<Value, ApiError> {
        self.request("/agents/me/avatar", upload(media)).await
    }

    pub async fn delete_agent_avatar(&self) -> Result<Value, ApiError> {
        self.request("/agents/me/avatar", RequestOptions::delete())
            .await
    }

    pub async fn get_agent_profile(&self, name: &str) -> Result<Value, ApiError> {
        self.request(&with_query("/agents/profile", [("name", name)]), RequestOptions::get())
            .await
    }
}
