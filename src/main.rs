use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use chunkscribe::application::ports::{AudioChunker, JobStore, StagingStore, TranscriptStore};
use chunkscribe::application::services::{JobRunner, TranscriptionService};
use chunkscribe::infrastructure::audio::{SymphoniaAudioChunker, TranscriptionEngineFactory};
use chunkscribe::infrastructure::observability::{TracingConfig, init_tracing};
use chunkscribe::infrastructure::persistence::InMemoryJobStore;
use chunkscribe::infrastructure::storage::{LocalStagingStore, LocalTranscriptStore};
use chunkscribe::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        &TracingConfig::from_settings(environment.as_str(), &settings.logging),
        settings.server.port,
    );

    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let staging_store: Arc<dyn StagingStore> = Arc::new(
        LocalStagingStore::new(PathBuf::from(&settings.storage.upload_dir))
            .context("Failed to open upload directory")?,
    );
    let transcript_store: Arc<dyn TranscriptStore> = Arc::new(
        LocalTranscriptStore::new(PathBuf::from(&settings.storage.transcripts_dir))
            .context("Failed to open transcripts directory")?,
    );
    let chunker: Arc<dyn AudioChunker> = Arc::new(SymphoniaAudioChunker::new());
    let transcription_engine = TranscriptionEngineFactory::create(&settings.transcription)
        .context("Failed to initialise transcription engine")?;

    let runner = Arc::new(JobRunner::new(
        Arc::clone(&job_store),
        Arc::clone(&staging_store),
        transcript_store,
        chunker,
        transcription_engine,
        Arc::new(Semaphore::new(settings.transcription.engine_permits())),
        settings.transcription.chunk_duration(),
        settings.storage.delete_upload_after_processing,
    ));

    let transcription_service = Arc::new(TranscriptionService::new(
        job_store,
        staging_store,
        runner,
    ));

    tracing::info!(
        provider = ?settings.transcription.provider,
        chunk_secs = settings.transcription.chunk_duration_secs,
        engine_permits = settings.transcription.engine_permits(),
        "Transcription pipeline ready"
    );

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let router = create_router(AppState {
        transcription_service,
        settings,
    });

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
