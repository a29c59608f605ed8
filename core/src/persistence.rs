use crate::*;

/// Named slots the session reads and writes: the resumable snapshot and the player level.
///
/// The level lives under its own key so it survives the snapshot being cleared on level completion.
#[derive(Clone, Debug)]
pub struct SaveSlots<S> {
    store: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> SaveSlots<S> {
    pub fn new(store: S, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn has_snapshot(&self) -> bool {
        self.store.contains(&self.keys.session)
    }

    /// `Ok(None)` when nothing is saved, `Err` when something is saved but unusable.
    pub fn load_snapshot(&self) -> Result<Option<SaveSnapshot>> {
        let Some(json) = self.store.get(&self.keys.session)? else {
            return Ok(None);
        };
        let snapshot = SaveSnapshot::from_json(&json)?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    pub fn save_snapshot(&mut self, snapshot: &SaveSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        self.store.set(&self.keys.session, &json)?;
        Ok(())
    }

    pub fn clear_snapshot(&mut self) -> Result<()> {
        self.store.remove(&self.keys.session)?;
        Ok(())
    }

    /// Stored player level, `None` when absent or unreadable.
    pub fn load_level(&self) -> Option<u32> {
        match self.store.get(&self.keys.level) {
            Ok(Some(value)) => match value.trim().parse::<u32>() {
                Ok(level) => Some(level.max(level::FIRST_LEVEL)),
                Err(err) => {
                    log::warn!("Ignoring stored level {value:?}: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("Could not read stored level: {err}");
                None
            }
        }
    }

    pub fn save_level(&mut self, level: u32) -> Result<()> {
        self.store.set(&self.keys.level, &level.to_string())?;
        Ok(())
    }
}
