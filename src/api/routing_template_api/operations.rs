use super::*;

impl RoutingTemplateApi {
    // ==========================================
    // 工序管理接口
    // ==========================================
    // 每次工序变更后重算模板 estimated_total_hours

    /// 新增工序
    ///
    /// # 说明
    /// - 工序绑定到 template_id,分配新ID
    /// - sequence_number 为 0 时取当前最大值 + 10
    /// - 前序工序必须属于同一模板
    pub fn add_operation(
        &self,
        template_id: &str,
        mut operation: RoutingOperation,
        actor: &str,
    ) -> ApiResult<RoutingOperation> {
        let snapshot = self.require_snapshot(template_id)?;

        if operation.operation_code.trim().is_empty() {
            return Err(ApiError::InvalidInput("工序编码不能为空".to_string()));
        }
        Self::ensure_predecessor_in_template(&snapshot, &operation, None)?;

        let now = Self::now();
        operation.operation_id = uuid::Uuid::new_v4().to_string();
        operation.template_id = template_id.to_string();
        if operation.sequence_number == 0 {
            operation.sequence_number = snapshot.next_sequence_number();
        }
        operation.created_by = Some(actor.to_string());
        operation.created_at = now;
        operation.last_modified_by = Some(actor.to_string());
        operation.last_modified_at = now;

        self.template_repo.save_operation(&operation)?;
        self.refresh_estimated_hours(template_id, Some(actor))?;

        info!(
            template_id = %template_id,
            operation_code = %operation.operation_code,
            sequence_number = operation.sequence_number,
            "工序已新增"
        );
        Ok(operation)
    }

    /// 更新工序 (所属模板不可变更)
    pub fn update_operation(
        &self,
        mut operation: RoutingOperation,
        actor: &str,
    ) -> ApiResult<RoutingOperation> {
        let existing = self.require_operation(&operation.operation_id)?;
        let snapshot = self.require_snapshot(&existing.template_id)?;

        if operation.operation_code.trim().is_empty() {
            return Err(ApiError::InvalidInput("工序编码不能为空".to_string()));
        }
        Self::ensure_predecessor_in_template(&snapshot, &operation, Some(&existing.operation_id))?;

        operation.template_id = existing.template_id.clone();
        operation.created_by = existing.created_by;
        operation.created_at = existing.created_at;
        operation.last_modified_by = Some(actor.to_string());
        operation.last_modified_at = Self::now();

        self.template_repo.save_operation(&operation)?;
        self.refresh_estimated_hours(&operation.template_id, Some(actor))?;

        debug!(operation_id = %operation.operation_id, "工序已更新");
        Ok(operation)
    }

    /// 删除工序; 指向它的前序引用一并清除
    pub fn delete_operation(&self, operation_id: &str, actor: &str) -> ApiResult<()> {
        let existing = self.require_operation(operation_id)?;

        if !self.template_repo.delete_operation(operation_id)? {
            return Err(ApiError::NotFound(format!("工序(id={})不存在", operation_id)));
        }
        self.refresh_estimated_hours(&existing.template_id, Some(actor))?;

        info!(
            template_id = %existing.template_id,
            operation_code = %existing.operation_code,
            "工序已删除"
        );
        Ok(())
    }

    /// 按给定顺序重排工序号 (1..n); 不属于该模板的ID忽略
    pub fn reorder_operations(
        &self,
        template_id: &str,
        ordered_operation_ids: &[String],
        actor: &str,
    ) -> ApiResult<Vec<RoutingOperation>> {
        let snapshot = self.require_snapshot(template_id)?;
        let now = Self::now();

        let mut sequence = 0;
        for id in ordered_operation_ids {
            let Some(op) = snapshot.operation(id) else {
                debug!(template_id = %template_id, operation_id = %id, "重排跳过未知工序");
                continue;
            };
            sequence += 1;

            let mut op = op.clone();
            op.sequence_number = sequence;
            op.last_modified_by = Some(actor.to_string());
            op.last_modified_at = now;
            self.template_repo.save_operation(&op)?;
        }

        self.refresh_estimated_hours(template_id, Some(actor))?;
        Ok(self.require_snapshot(template_id)?.operations)
    }

    pub fn get_operation(&self, operation_id: &str) -> ApiResult<RoutingOperation> {
        self.require_operation(operation_id)
    }

    /// 模板的有效工序,按工序号排序
    pub fn list_operations(&self, template_id: &str) -> ApiResult<Vec<RoutingOperation>> {
        let snapshot = self.require_snapshot(template_id)?;
        Ok(snapshot.active_operations().cloned().collect())
    }

    fn ensure_predecessor_in_template(
        snapshot: &TemplateSnapshot,
        operation: &RoutingOperation,
        self_id: Option<&str>,
    ) -> ApiResult<()> {
        let Some(prev_id) = operation.previous_operation_id.as_deref() else {
            return Ok(());
        };
        if Some(prev_id) == self_id || snapshot.operation(prev_id).is_none() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "工序 {} 的前序工序({})不属于本模板",
                operation.operation_code, prev_id
            )));
        }
        Ok(())
    }
}
