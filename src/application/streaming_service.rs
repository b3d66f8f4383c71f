// Streaming assessment service - Progressive per-vehicle results for a group
use crate::application::assessment_service::AssessmentService;
use crate::domain::fleet::VehicleView;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, mpsc};

const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StreamEvent {
    Started { group: String, total: usize },
    Vehicle { view: Box<VehicleView> },
    Failed { group: String, message: String },
    Complete { total: usize, duration_ms: i64 },
}

#[derive(Clone)]
pub struct StreamingAssessmentService {
    service: AssessmentService,
    concurrency: usize,
}

impl StreamingAssessmentService {
    pub fn new(service: AssessmentService, concurrency: usize) -> Self {
        Self {
            service,
            concurrency: concurrency.max(1),
        }
    }

    /// `started` first, then one `vehicle` event per vehicle in completion
    /// order, then `complete` once every vehicle task has finished.
    pub async fn stream_group(&self, group: &str) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let start_time = Instant::now();

        let vehicles = match self.service.list_vehicles(group).await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                tracing::error!("Error listing vehicles for group {}: {:#}", group, e);
                let _ = tx
                    .send(StreamEvent::Failed {
                        group: group.to_string(),
                        message: e.to_string(),
                    })
                    .await;
                return rx;
            }
        };

        let total = vehicles.len();
        let _ = tx
            .send(StreamEvent::Started {
                group: group.to_string(),
                total,
            })
            .await;

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(total);

        for vehicle in vehicles {
            let tx = tx.clone();
            let service = self.service.clone();
            let permits = permits.clone();

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                let view = service.assess_vehicle(&vehicle).await;
                let _ = tx.send(StreamEvent::Vehicle { view: Box::new(view) }).await;
            }));
        }

        tokio::spawn(async move {
            for result in futures::future::join_all(handles).await {
                if let Err(e) = result {
                    tracing::error!("Vehicle assessment task failed: {}", e);
                }
            }

            let duration_ms = start_time.elapsed().as_millis() as i64;
            let _ = tx.send(StreamEvent::Complete { total, duration_ms }).await;
        });

        rx
    }
}
