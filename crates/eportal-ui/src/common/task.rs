use crate::forms::FormKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Backend call owned by one form (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, id: TaskId) {
        self.active = Some(id);
    }

    /// Clears the task if `id` is the active one. Stale ids return false.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub login: TaskState,
    pub forgot_password: TaskState,
    pub register: TaskState,
    pub profile: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: FormKind) -> &TaskState {
        match kind {
            FormKind::Login => &self.login,
            FormKind::ForgotPassword => &self.forgot_password,
            FormKind::Register => &self.register,
            FormKind::Profile => &self.profile,
        }
    }

    pub fn state_mut(&mut self, kind: FormKind) -> &mut TaskState {
        match kind {
            FormKind::Login => &mut self.login,
            FormKind::ForgotPassword => &mut self.forgot_password,
            FormKind::Register => &mut self.register,
            FormKind::Profile => &mut self.profile,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.login.is_running()
            || self.forgot_password.is_running()
            || self.register.is_running()
            || self.profile.is_running()
    }
}
