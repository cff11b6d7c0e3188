/// Scope tag namespacing every logical key in the index.
///
/// The composite key scheme (`SCOPE.suffix`) is load-bearing: deletion
/// recomputes keys from an owner's identity rather than following a stored
/// reference, so the same construction must be used on write and on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKey {
    Temp,
    Apt,
    Article,
    Lesson,
    Center,
    User,
}

impl ImageKey {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Temp => "TEMP",
            Self::Apt => "APT",
            Self::Article => "ARTICLE",
            Self::Lesson => "LESSON",
            Self::Center => "CENTER",
            Self::User => "USER",
        }
    }

    /// Build the composite logical key `SCOPE.<suffix>`.
    pub fn key(self, suffix: &str) -> String {
        format!("{}.{suffix}", self.tag())
    }

    /// Public path segment for files homed under this scope.
    pub fn area(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Article => "article",
            Self::Lesson => "lesson",
            Self::Center => "center",
            Self::Temp | Self::User => "user",
        }
    }
}

/// The uploading identity a staging slot is keyed by: a username with an
/// optional profile sub-scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub username: String,
    pub profile_id: Option<i64>,
}

impl Subject {
    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            profile_id: None,
        }
    }

    pub fn profile(username: impl Into<String>, profile_id: i64) -> Self {
        Self {
            username: username.into(),
            profile_id: Some(profile_id),
        }
    }

    /// Key suffix: `<username>` or `<username>.<profileId>`.
    pub fn suffix(&self) -> String {
        match self.profile_id {
            Some(id) => format!("{}.{id}", self.username),
            None => self.username.clone(),
        }
    }

    /// Logical key of this subject's staging slot.
    pub fn temp_key(&self) -> String {
        ImageKey::Temp.key(&self.suffix())
    }

    /// Directory staged single uploads land in.
    pub fn temp_dir(&self) -> String {
        match self.profile_id {
            Some(id) => format!("/api/user/{}/temp/{id}/", self.username),
            None => format!("/api/user/{}/temp/", self.username),
        }
    }

    /// Directory staged list uploads land in.
    pub fn temp_list_dir(&self) -> String {
        match self.profile_id {
            Some(id) => format!("/api/user/{}/temp_list/{id}/", self.username),
            None => format!("/api/user/{}/temp_list/", self.username),
        }
    }

    /// Directory a promoted profile image lands in.
    pub fn profile_image_dir(&self, profile_id: i64) -> String {
        format!("/api/user/{}/profile/{profile_id}/", self.username)
    }
}

/// A permanent attachment owner: scope tag plus entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub scope: ImageKey,
    pub id: i64,
}

impl Owner {
    pub fn apt(id: i64) -> Self {
        Self {
            scope: ImageKey::Apt,
            id,
        }
    }

    pub fn article(id: i64) -> Self {
        Self {
            scope: ImageKey::Article,
            id,
        }
    }

    pub fn lesson(id: i64) -> Self {
        Self {
            scope: ImageKey::Lesson,
            id,
        }
    }

    pub fn center(id: i64) -> Self {
        Self {
            scope: ImageKey::Center,
            id,
        }
    }

    pub fn logical_key(&self) -> String {
        self.scope.key(&self.id.to_string())
    }

    /// Directory promoted files are homed in.
    pub fn dir(&self) -> String {
        format!("/api/{}/{}/", self.scope.area(), self.id)
    }
}
