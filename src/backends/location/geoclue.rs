// SPDX-License-Identifier: GPL-3.0-only

//! GeoClue2 geolocation over the D-Bus system bus
//!
//! Each request creates its own GeoClue client so concurrent requests never
//! share state:
//!
//! 1. `Manager.CreateClient` returns a fresh client object
//! 2. `DesktopId` and `RequestedAccuracyLevel` are set on it
//! 3. the client's `LocationUpdated` signal is subscribed, then `Start` is called
//! 4. the first update's `Location` object is read
//! 5. `Stop` and `Manager.DeleteClient` release the client
//!
//! Steps 1 to 4 share the request's timeout.

use super::{GeolocationProvider, Position, PositionError, PositionFuture, PositionOptions};
use crate::constants::location::{
    CLIENT_RELEASE_TIMEOUT_MS, GEOCLUE_LEVEL_EXACT, GEOCLUE_LEVEL_STREET,
};
use futures::{FutureExt, StreamExt};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zbus::zvariant::OwnedObjectPath;

const GEOCLUE_SERVICE: &str = "org.freedesktop.GeoClue2";
const MANAGER_PATH: &str = "/org/freedesktop/GeoClue2/Manager";
const MANAGER_INTERFACE: &str = "org.freedesktop.GeoClue2.Manager";
const CLIENT_INTERFACE: &str = "org.freedesktop.GeoClue2.Client";
const LOCATION_INTERFACE: &str = "org.freedesktop.GeoClue2.Location";

/// Last fix handed out, for requests that accept a cached position
type FixCache = Arc<Mutex<Option<(Position, Instant)>>>;

/// Location provider backed by the GeoClue2 service
#[derive(Clone)]
pub struct GeoClueProvider {
    connection: Option<zbus::Connection>,
    desktop_id: String,
    cache: FixCache,
}

impl GeoClueProvider {
    /// Connect to the system bus and check that GeoClue can be reached
    ///
    /// Never fails: without a bus or without the service the provider reports
    /// itself as unsupported.
    pub async fn connect(desktop_id: impl Into<String>) -> Self {
        let desktop_id = desktop_id.into();
        let connection = match zbus::Connection::system().await {
            Ok(connection) => match service_present(&connection).await {
                Ok(true) => Some(connection),
                Ok(false) => {
                    info!("GeoClue2 service not present on the system bus");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Failed to query the system bus for GeoClue2");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to connect to system D-Bus");
                None
            }
        };

        Self {
            connection,
            desktop_id,
            cache: Arc::new(Mutex::new(None)),
        }
    }
}

impl GeolocationProvider for GeoClueProvider {
    fn is_supported(&self) -> bool {
        self.connection.is_some()
    }

    fn current_position(&self, options: PositionOptions) -> PositionFuture {
        let connection = self.connection.clone();
        let desktop_id = self.desktop_id.clone();
        let cache = Arc::clone(&self.cache);

        async move {
            let connection = connection.ok_or(PositionError::Unsupported)?;

            if let Some(position) = cached_fix(&cache, &options) {
                debug!("Using cached position");
                return Ok(position);
            }

            let position = request_position(&connection, &desktop_id, &options).await?;
            if let Ok(mut guard) = cache.lock() {
                *guard = Some((position, Instant::now()));
            }
            Ok(position)
        }
        .boxed()
    }
}

fn cached_fix(cache: &FixCache, options: &PositionOptions) -> Option<Position> {
    if options.max_cache_age.is_zero() {
        return None;
    }
    let guard = cache.lock().ok()?;
    let (position, at) = guard.as_ref()?;
    (at.elapsed() <= options.max_cache_age).then_some(*position)
}

async fn service_present(connection: &zbus::Connection) -> zbus::Result<bool> {
    let dbus = zbus::fdo::DBusProxy::new(connection).await?;
    let running = dbus.list_names().await?;
    if running.iter().any(|name| name.as_str() == GEOCLUE_SERVICE) {
        return Ok(true);
    }
    // GeoClue is normally bus-activated on first use
    let activatable = dbus.list_activatable_names().await?;
    Ok(activatable.iter().any(|name| name.as_str() == GEOCLUE_SERVICE))
}

/// Full client lifecycle for one request
///
/// One deadline covers proxy setup, `CreateClient` and the wait for the first
/// fix. A created client is released even when the deadline passes.
async fn request_position(
    connection: &zbus::Connection,
    desktop_id: &str,
    options: &PositionOptions,
) -> Result<Position, PositionError> {
    let deadline = Instant::now() + options.timeout;

    let manager = within(deadline, async {
        zbus::Proxy::new(connection, GEOCLUE_SERVICE, MANAGER_PATH, MANAGER_INTERFACE)
            .await
            .map_err(classify)
    })
    .await?;

    let client_path: OwnedObjectPath = within(deadline, async {
        manager.call("CreateClient", &()).await.map_err(classify)
    })
    .await?;
    debug!(client = %client_path, "Created GeoClue client");

    let client = within(deadline, async {
        zbus::Proxy::new(
            connection,
            GEOCLUE_SERVICE,
            client_path.as_str(),
            CLIENT_INTERFACE,
        )
        .await
        .map_err(classify)
    })
    .await;

    let result = match client {
        Ok(client) => {
            let result = within(
                deadline,
                wait_for_fix(connection, &client, desktop_id, options.high_accuracy),
            )
            .await;
            release(client.call::<_, _, ()>("Stop", &()), "stop").await;
            result
        }
        Err(e) => Err(e),
    };
    release(
        manager.call::<_, _, ()>("DeleteClient", &(&client_path,)),
        "delete",
    )
    .await;

    match &result {
        Ok(position) => info!(accuracy = position.accuracy, "Position acquired"),
        Err(e) => warn!(error = %e, "Position request failed"),
    }
    result
}

/// Run `step` unless `deadline` passes first, which counts as a timeout
async fn within<T>(
    deadline: Instant,
    step: impl Future<Output = Result<T, PositionError>>,
) -> Result<T, PositionError> {
    tokio::time::timeout_at(deadline, step)
        .await
        .unwrap_or(Err(PositionError::Timeout))
}

/// Best-effort client cleanup, bounded so a stuck bus cannot hold the request
async fn release(call: impl Future<Output = zbus::Result<()>>, what: &str) {
    let bound = Duration::from_millis(CLIENT_RELEASE_TIMEOUT_MS);
    match tokio::time::timeout(bound, call).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, what, "Failed to release GeoClue client"),
        Err(_) => debug!(what, "Timed out releasing GeoClue client"),
    }
}

async fn wait_for_fix(
    connection: &zbus::Connection,
    client: &zbus::Proxy<'_>,
    desktop_id: &str,
    high_accuracy: bool,
) -> Result<Position, PositionError> {
    let level = if high_accuracy {
        GEOCLUE_LEVEL_EXACT
    } else {
        GEOCLUE_LEVEL_STREET
    };

    client
        .set_property("DesktopId", desktop_id)
        .await
        .map_err(classify)?;
    client
        .set_property("RequestedAccuracyLevel", level)
        .await
        .map_err(classify)?;

    // Subscribe before Start so the first update cannot be missed
    let mut updates = client
        .receive_signal("LocationUpdated")
        .await
        .map_err(classify)?;
    client.call::<_, _, ()>("Start", &()).await.map_err(classify)?;
    debug!(level, "GeoClue client started");

    let message = updates.next().await.ok_or(PositionError::PositionUnavailable)?;
    let (_old, new): (OwnedObjectPath, OwnedObjectPath) =
        message.body().deserialize().map_err(classify)?;

    let location = zbus::Proxy::new(connection, GEOCLUE_SERVICE, new.as_str(), LOCATION_INTERFACE)
        .await
        .map_err(classify)?;

    let latitude: f64 = location.get_property("Latitude").await.map_err(classify)?;
    let longitude: f64 = location.get_property("Longitude").await.map_err(classify)?;
    let accuracy: f64 = location.get_property("Accuracy").await.map_err(classify)?;

    Ok(Position {
        latitude,
        longitude,
        accuracy,
    })
}

/// Classify a D-Bus failure once the service has answered
fn classify(err: impl Into<zbus::Error>) -> PositionError {
    let err = err.into();
    let denied = match &err {
        zbus::Error::MethodError(name, _, _) => is_denial(name.as_str()),
        zbus::Error::FDO(fdo) => matches!(**fdo, zbus::fdo::Error::AccessDenied(_)),
        _ => false,
    };

    if denied {
        PositionError::PermissionDenied
    } else {
        debug!(error = %err, "GeoClue request failed");
        PositionError::PositionUnavailable
    }
}

fn is_denial(error_name: &str) -> bool {
    error_name.ends_with(".AccessDenied") || error_name.ends_with(".NotAuthorized")
}
