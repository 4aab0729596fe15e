use std::path::PathBuf;
use std::sync::Arc;

use common::geocode::DisabledGeocoder;
use configs::{LimitsConfig, StorageConfig};
use service::auth::{domain::{LoginInput, RegisterInput}, errors::AuthError, repository::FileAuthRepository, AuthService};
use service::collection_points::{CollectionPointInput, CollectionPointService};
use service::comments::CommentService;
use service::moderation::BanService;
use service::posts::{NewPost, PostFilter, PostService};
use service::uploads::UploadPolicy;
use service::users::UserService;
use service::{Actor, ServiceError, Storage};

struct Env {
    root: PathBuf,
    storage: Storage,
}

impl Env {
    async fn new() -> anyhow::Result<Self> {
        let root = std::env::temp_dir().join(format!("sos_it_{}", uuid::Uuid::new_v4()));
        let storage = Storage::open(&StorageConfig::rooted_at(&root)).await?;
        Ok(Self { root, storage })
    }

    async fn register(&self, email: &str, nickname: &str) -> anyhow::Result<Actor> {
        let auth = AuthService::new(Arc::new(FileAuthRepository::new(self.storage.clone())));
        auth.register(RegisterInput {
            email: email.into(),
            password: "Secret123".into(),
            confirm_password: "Secret123".into(),
            name: nickname.into(),
            nickname: Some(nickname.into()),
        })
        .await?;
        let session = auth.login(LoginInput { email: email.into(), password: "Secret123".into() }).await?;
        Ok(session.actor())
    }

    async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.root).await;
    }
}

#[tokio::test]
async fn report_lifecycle() -> anyhow::Result<()> {
    let env = Env::new().await?;
    let ana = env.register("ana@mail.com", "ana").await?;
    let bia = env.register("bia@mail.com", "bia").await?;

    let posts = PostService::new(env.storage.clone());
    let comments = CommentService::new(env.storage.clone());

    let post = posts
        .create(&ana, NewPost { description: "Entulho na praia".into(), address: "Cabo Branco".into(), tags: "praia".into(), image_path: None })
        .await?;
    let other = posts
        .create(&bia, NewPost { description: "Sofá abandonado".into(), address: "Centro".into(), tags: "entulho".into(), image_path: None })
        .await?;

    comments.add(&bia, &post.id, "vou levar sacos").await?;
    comments.add(&ana, &other.id, "avisei a prefeitura").await?;

    let first = posts.toggle_like(&bia, &post.id).await?;
    let second = posts.toggle_like(&bia, &post.id).await?;
    assert!(first.liked && !second.liked);
    assert_eq!(second.likes_count, 0);

    let feed = posts.feed(Some(&ana), &PostFilter { q: Some("praia".into()), tag: None }, None).await;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].comments_count, 1);
    assert_eq!(feed[0].author_nick, "ana");

    assert!(matches!(posts.delete(&bia, &post.id).await, Err(ServiceError::Forbidden(_))));
    posts.delete(&ana, &post.id).await?;

    let left = env.storage.comments.read_all().await;
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].post_id, other.id);
    assert!(comments.list_for_post(&post.id, None).await.is_empty());

    env.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn banned_members_are_locked_out() -> anyhow::Result<()> {
    let env = Env::new().await?;
    let bia = env.register("bia@mail.com", "bia").await?;
    let boss = env.register("boss@mail.com", "boss").await?;

    let seed_admin = Actor { user_id: boss.user_id.clone(), is_admin: true, is_dev: false };
    UserService::new(env.storage.clone()).promote(&seed_admin, &boss.user_id).await?;

    let bans = BanService::new(env.storage.clone());
    assert!(bans.ban(&seed_admin, "BIA@mail.com", "spam").await?);
    assert!(matches!(bans.ban(&seed_admin, "boss@mail.com", "x").await, Err(ServiceError::Forbidden(_))));

    let auth = AuthService::new(Arc::new(FileAuthRepository::new(env.storage.clone())));
    let login = auth.login(LoginInput { email: "bia@mail.com".into(), password: "Secret123".into() }).await;
    assert!(matches!(login, Err(AuthError::Banned)));
    assert!(auth.current_user(&bia.user_id).await?.is_none());

    assert!(bans.unban(&seed_admin, "bia@mail.com").await?);
    assert!(auth.current_user(&bia.user_id).await?.is_some());

    env.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn corrupt_collection_is_read_as_empty_but_never_overwritten() -> anyhow::Result<()> {
    let env = Env::new().await?;
    let ana = env.register("ana@mail.com", "ana").await?;
    tokio::fs::write(env.storage.posts.path(), b"[{\"id\": \"p1\",").await?;

    let posts = PostService::new(env.storage.clone());
    assert!(posts.feed(None, &PostFilter::default(), None).await.is_empty());
    assert!(matches!(env.storage.posts.try_read_all().await, Err(ServiceError::Corrupt { .. })));

    let create = posts
        .create(&ana, NewPost { description: "x".into(), ..Default::default() })
        .await;
    assert!(matches!(create, Err(ServiceError::Corrupt { .. })));
    let raw = tokio::fs::read_to_string(env.storage.posts.path()).await?;
    assert_eq!(raw, "[{\"id\": \"p1\",");

    env.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn collection_points_survive_without_geocoding() -> anyhow::Result<()> {
    let env = Env::new().await?;
    let boss = env.register("boss@mail.com", "boss").await?;
    let admin = Actor { is_admin: true, ..boss };

    let points = CollectionPointService::new(env.storage.clone(), Arc::new(DisabledGeocoder));
    let point = points
        .add(
            &admin,
            CollectionPointInput {
                name: "Ecoponto Bessa".into(),
                kind: "eletronico".into(),
                street: "Av. Argemiro de Figueiredo".into(),
                number: "2000".into(),
                neighborhood: "Bessa".into(),
            },
        )
        .await?;
    assert!(!point.is_located());

    let raw: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(env.storage.collection_points.path()).await?)?;
    assert_eq!(raw[0]["type"], "eletronico");
    assert_eq!(raw[0]["lat"], 0.0);

    env.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn uploaded_post_image_is_removed_with_its_post() -> anyhow::Result<()> {
    let env = Env::new().await?;
    let ana = env.register("ana@mail.com", "ana").await?;

    let uploads = UploadPolicy::new(env.storage.clone(), LimitsConfig::default());
    let planned = uploads.post_image(&ana.user_id, "foto lixo.jpg", 4)?;
    tokio::fs::create_dir_all(planned.disk_path.parent().unwrap()).await?;
    tokio::fs::write(&planned.disk_path, b"jpeg").await?;

    let posts = PostService::new(env.storage.clone());
    let post = posts
        .create(&ana, NewPost { description: "Lixo".into(), image_path: Some(planned.stored_path.clone()), ..Default::default() })
        .await?;
    assert_eq!(post.image_path, planned.stored_path);

    posts.delete(&ana, &post.id).await?;
    assert!(!planned.disk_path.exists());

    env.cleanup().await;
    Ok(())
}
