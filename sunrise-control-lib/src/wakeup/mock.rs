//! A scripted, recording [`LightClient`] for exercising the engine under paused time.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::time::Instant;

use crate::light::color::Color;
use crate::util::traits::LightClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    NotFound,
    Found,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Find { light_id: u64, at: Instant },
    SetColor { color: Color, fade: Duration, at: Instant },
    SetPower { on: bool, fade: Duration, at: Instant },
}

#[derive(Default)]
pub(crate) struct MockClient {
    /// Answers for successive lookups; once exhausted every lookup is "not found".
    pub(crate) lookups: Mutex<VecDeque<Lookup>>,
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) fail_set_color: bool,
    pub(crate) fail_set_power: bool,
}

impl MockClient {
    pub(crate) fn new(lookups: impl IntoIterator<Item = Lookup>) -> Self {
        MockClient {
            lookups: Mutex::new(lookups.into_iter().collect()),
            ..Default::default()
        }
    }

    pub(crate) fn found() -> Self {
        Self::new([Lookup::Found])
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn lookup_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Find { .. }))
            .count()
    }

    pub(crate) fn color_calls(&self) -> Vec<(Color, Duration, Instant)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetColor { color, fade, at } => Some((color, fade, at)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn power_calls(&self) -> Vec<(bool, Duration, Instant)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetPower { on, fade, at } => Some((on, fade, at)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LightClient for MockClient {
    type Handle = u64;

    async fn find_by_id(&self, light_id: u64) -> anyhow::Result<Option<u64>> {
        self.record(Call::Find {
            light_id,
            at: Instant::now(),
        });
        let lookup = self
            .lookups
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Lookup::NotFound);
        match lookup {
            Lookup::NotFound => Ok(None),
            Lookup::Found => Ok(Some(light_id)),
            Lookup::Fail => Err(anyhow!("socket closed")),
        }
    }

    async fn set_color(&self, _light: &u64, color: Color, fade: Duration) -> anyhow::Result<()> {
        self.record(Call::SetColor {
            color,
            fade,
            at: Instant::now(),
        });
        if self.fail_set_color {
            return Err(anyhow!("no acknowledgement"));
        }
        Ok(())
    }

    async fn set_power(&self, _light: &u64, on: bool, fade: Duration) -> anyhow::Result<()> {
        self.record(Call::SetPower {
            on,
            fade,
            at: Instant::now(),
        });
        if self.fail_set_power {
            return Err(anyhow!("no acknowledgement"));
        }
        Ok(())
    }
}
