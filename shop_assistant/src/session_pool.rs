use crate::{
    config::{ModelConfig, Validatable},
    error::ModelError,
};
use ndarray::{ArrayD, ArrayViewD};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// A fixed set of ONNX Runtime sessions over one model file.
///
/// Requests are spread round-robin across the sessions; a session is locked
/// only for the duration of a single `run`.
#[derive(Clone)]
pub struct SessionPool {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
    output_name: String,
}

impl SessionPool {
    pub fn new(model_config: &ModelConfig) -> Result<Self, ModelError> {
        let num_instances = model_config.num_instances.max(1);
        let sessions = (0..num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .commit_from_file(model_config.get_path())?;
                Ok(Arc::new(Mutex::new(session)))
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        tracing::info!(
            "Created {} ONNX sessions for {:?}",
            num_instances,
            model_config.get_path()
        );

        Ok(Self {
            sessions: Arc::new(sessions),
            counter: Arc::new(AtomicUsize::new(0)),
            output_name: model_config.output_name.clone(),
        })
    }

    /// Producer name and version recorded in the model metadata, if any.
    pub fn producer(&self) -> Option<String> {
        let session = self.sessions.first()?.lock().ok()?;
        let metadata = session.metadata().ok()?;
        let producer = metadata.producer().ok()?;
        let version = metadata.version().ok();
        Some(match version {
            Some(version) => format!("{} (model version {})", producer, version),
            None => producer,
        })
    }

    /// Same as [`SessionPool::run`], but on tokio's blocking pool.
    pub async fn run_blocking(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>, ModelError> {
        let pool = self.clone();
        offload(move || pool.run(input.view())).await
    }

    pub fn run(&self, input: ArrayViewD<'_, f32>) -> Result<ArrayD<f32>, ModelError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let mut session = self.sessions[index]
            .lock()
            .map_err(|e| ModelError::Poisoned(e.to_string()))?;

        tracing::debug!("Handling request with session {}", index);
        let owned_buffer;
        let input_view = if input.is_standard_layout() {
            input.view()
        } else {
            owned_buffer = input.to_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)?;
        let outputs = session.run(ort::inputs![tensor_ref])?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ModelError::UnexpectedOutput(format!("no output named `{}`", self.output_name))
        })?;
        let (shape, data) = output.try_extract_tensor::<f32>()?;

        let array = ArrayD::from_shape_vec(shape.to_ixdyn(), data.to_vec())?;
        Ok(array)
    }
}

/// Moves CPU-bound model work off the async worker threads.
pub async fn offload<T, F>(work: F) -> Result<T, ModelError>
where
    F: FnOnce() -> Result<T, ModelError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
